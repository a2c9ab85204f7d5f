//! Raw deflate blocks.
//!
//! ORC writes each compression block as a bare deflate stream (no zlib header, no
//! adler32 trailer), so the inflater is created without wrapper support and with the
//! default 32 KiB window.

use flate2::{Decompress, FlushDecompress, Status};
use orcstream_common::{Result, error::Error};

use crate::{BlockDecompressor, CompressionKind};

pub struct ZlibDecompressor;

impl BlockDecompressor for ZlibDecompressor {
    fn kind(&self) -> CompressionKind {
        CompressionKind::Zlib
    }

    fn decompress(&self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        if input.is_empty() {
            log::error!("Error occurred while decompressing with zlib inflator: empty block");
            return Err(Error::codec("zlib", "empty deflate block"));
        }

        let mut inflater = Decompress::new(false);
        let status = inflater
            .decompress(input, output, FlushDecompress::Finish)
            .map_err(|e| {
                log::error!("Error occurred while decompressing with zlib inflator: {e}");
                Error::codec_with_source("zlib", "corrupt deflate stream", e)
            })?;

        let produced = inflater.total_out() as usize;
        match status {
            Status::StreamEnd => Ok(produced),
            Status::Ok | Status::BufError if produced == output.len() => {
                log::error!(
                    "Inflated block exceeds buffer size ({}), {} input bytes consumed of {}",
                    output.len(),
                    inflater.total_in(),
                    input.len()
                );
                Err(Error::codec(
                    "zlib",
                    format!("decompressed block exceeds buffer size {}", output.len()),
                ))
            }
            Status::Ok | Status::BufError => {
                log::error!(
                    "Deflate stream ended early after {produced} bytes ({} of {} input bytes)",
                    inflater.total_in(),
                    input.len()
                );
                Err(Error::codec("zlib", "truncated deflate stream"))
            }
        }
    }
}
