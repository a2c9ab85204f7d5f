//! LZ4 raw blocks. ORC does not prefix the block with its uncompressed size, so the
//! output capacity is passed as the decoding bound.

use orcstream_common::{Result, error::Error};

use crate::{BlockDecompressor, CompressionKind};

pub struct Lz4Decompressor;

impl BlockDecompressor for Lz4Decompressor {
    fn kind(&self) -> CompressionKind {
        CompressionKind::Lz4
    }

    fn decompress(&self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        let capacity = i32::try_from(output.len())
            .map_err(|_| Error::invalid_arg("output", "LZ4 output buffer exceeds i32::MAX"))?;
        ::lz4::block::decompress_to_buffer(input, Some(capacity), output).map_err(|e| {
            log::error!(
                "Failed to decompress LZ4 block of {} bytes into {} byte buffer: {e}",
                input.len(),
                output.len()
            );
            Error::codec_with_source("lz4", "failed to decompress block", e)
        })
    }
}
