//! Zstandard blocks, each holding one complete zstd frame.

use orcstream_common::{Result, error::Error};

use crate::{BlockDecompressor, CompressionKind};

pub struct ZstdDecompressor;

impl BlockDecompressor for ZstdDecompressor {
    fn kind(&self) -> CompressionKind {
        CompressionKind::Zstd
    }

    fn decompress(&self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        ::zstd::bulk::decompress_to_buffer(input, output).map_err(|e| {
            log::error!(
                "Failed to decompress ZSTD block of {} bytes into {} byte buffer: {e}",
                input.len(),
                output.len()
            );
            Error::codec_with_source("zstd", "failed to decompress frame", e)
        })
    }
}
