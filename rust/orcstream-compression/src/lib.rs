//! Block decompression codecs used by compressed ORC streams.
//!
//! Every compressed block of a stream is decoded independently: the codec receives
//! the block payload and a bounded output buffer, and either fills a prefix of the
//! output or fails. The stream layer owns the output buffer and the block framing;
//! this crate only integrates the codec libraries behind [`BlockDecompressor`].

mod kind;
pub mod lz4_block;
pub mod snappy;
pub mod zlib;
pub mod zstd_frame;

pub use kind::CompressionKind;

use orcstream_common::{Result, error::Error};

/// Decodes a single compressed block into a caller-provided buffer.
pub trait BlockDecompressor: Send + Sync {
    fn kind(&self) -> CompressionKind;

    /// Decompresses `input` into the front of `output` and returns the number of
    /// decompressed bytes.
    ///
    /// `output.len()` is the capacity bound: a block that would decode to more than
    /// `output.len()` bytes is an error, never a truncated result.
    fn decompress(&self, input: &[u8], output: &mut [u8]) -> Result<usize>;
}

/// Creates the decompressor for `kind`.
///
/// Returns `Ok(None)` for [`CompressionKind::None`], where no block framing applies.
pub fn create_decompressor(kind: CompressionKind) -> Result<Option<Box<dyn BlockDecompressor>>> {
    let decompressor: Box<dyn BlockDecompressor> = match kind {
        CompressionKind::None => return Ok(None),
        CompressionKind::Zlib => Box::new(zlib::ZlibDecompressor),
        CompressionKind::Snappy => Box::new(snappy::SnappyDecompressor),
        CompressionKind::Lz4 => Box::new(lz4_block::Lz4Decompressor),
        CompressionKind::Zstd => Box::new(zstd_frame::ZstdDecompressor),
        CompressionKind::Lzo => {
            log::error!("Compression kind is unsupported. ID: {}", kind.id());
            return Err(Error::unsupported_codec(kind.name()));
        }
    };
    Ok(Some(decompressor))
}

#[cfg(test)]
mod tests {
    use orcstream_common::error::ErrorKind;

    use crate::{CompressionKind, create_decompressor};

    #[test]
    fn test_create_decompressor() {
        assert!(create_decompressor(CompressionKind::None).unwrap().is_none());
        for kind in [
            CompressionKind::Zlib,
            CompressionKind::Snappy,
            CompressionKind::Lz4,
            CompressionKind::Zstd,
        ] {
            let decompressor = create_decompressor(kind).unwrap().unwrap();
            assert_eq!(decompressor.kind(), kind);
        }

        let err = create_decompressor(CompressionKind::Lzo).err().unwrap();
        assert!(matches!(err.kind(), ErrorKind::UnsupportedCodec { name } if name == "lzo"));
    }
}
