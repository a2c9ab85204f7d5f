//! Header of a compressed-stream block.
//!
//! ```text
//!  byte 0           byte 1     byte 2
//! +-------------+-+----------+----------+
//! | len[6:0]    |S| len[14:7]| len[22:15]|
//! +-------------+-+----------+----------+
//! ```
//!
//! `S` (bit 0 of byte 0) is set when the payload is stored literally ("original"),
//! which writers do when compression would not shrink the block. The remaining 23
//! bits hold the on-disk payload length, little-endian.

use orcstream_common::{Result, error::Error, verify_data};

pub const BLOCK_HEADER_SIZE: usize = 3;

/// Largest payload length representable in a block header.
pub const MAX_BLOCK_LENGTH: usize = (1 << 23) - 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    /// The payload holds literal bytes and bypasses the codec.
    pub stored: bool,
    /// On-disk length of the payload that follows the header.
    pub length: usize,
}

impl BlockHeader {
    pub fn stored(length: usize) -> BlockHeader {
        BlockHeader {
            stored: true,
            length,
        }
    }

    pub fn compressed(length: usize) -> BlockHeader {
        BlockHeader {
            stored: false,
            length,
        }
    }

    pub fn decode(bytes: [u8; BLOCK_HEADER_SIZE]) -> BlockHeader {
        let length =
            ((bytes[2] as usize) << 15) | ((bytes[1] as usize) << 7) | ((bytes[0] as usize) >> 1);
        BlockHeader {
            stored: bytes[0] & 0x01 != 0,
            length,
        }
    }

    pub fn from_slice(bytes: &[u8]) -> Result<BlockHeader> {
        verify_data!(block_header, bytes.len() == BLOCK_HEADER_SIZE);
        Ok(BlockHeader::decode([bytes[0], bytes[1], bytes[2]]))
    }

    pub fn encode(&self) -> Result<[u8; BLOCK_HEADER_SIZE]> {
        if self.length > MAX_BLOCK_LENGTH {
            return Err(Error::invalid_arg(
                "length",
                format!("{} exceeds maximum block length {MAX_BLOCK_LENGTH}", self.length),
            ));
        }
        let value = (self.length << 1) | self.stored as usize;
        Ok([value as u8, (value >> 8) as u8, (value >> 16) as u8])
    }
}
