//! Snappy raw blocks (no framing format, no checksum).

use orcstream_common::{Result, error::Error};

use crate::{BlockDecompressor, CompressionKind};

pub struct SnappyDecompressor;

impl SnappyDecompressor {
    /// Reads the uncompressed length stored in the block preamble.
    pub fn uncompressed_len(input: &[u8]) -> Result<usize> {
        snap::raw::decompress_len(input).map_err(|e| {
            log::error!("Error occurred while calculating uncompressed size of snappy block: {e}");
            Error::codec_with_source("snappy", "invalid block preamble", e)
        })
    }
}

impl BlockDecompressor for SnappyDecompressor {
    fn kind(&self) -> CompressionKind {
        CompressionKind::Snappy
    }

    fn decompress(&self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        let len = Self::uncompressed_len(input)?;
        if len > output.len() {
            log::error!(
                "Uncompressed stream size ({len}) exceeds buffer size ({})",
                output.len()
            );
            return Err(Error::block_too_large(len, output.len()));
        }

        snap::raw::Decoder::new()
            .decompress(input, &mut output[..len])
            .map_err(|e| {
                log::error!("Error occurred while uncompressing with snappy: {e}");
                Error::codec_with_source("snappy", "corrupt block", e)
            })
    }
}
