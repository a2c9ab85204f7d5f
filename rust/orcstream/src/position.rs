//! Seek coordinates taken from ORC row-index entries.

use orcstream_common::{Result, error::Error};

/// Target of a stream seek.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamPosition {
    /// Offset relative to the start of the stream. For compressed streams this is the
    /// offset of the header of the block that holds the target.
    pub byte_offset: u64,
    /// Offset within the decompressed block. Only meaningful for compressed streams.
    pub block_offset: Option<usize>,
}

impl StreamPosition {
    pub fn uncompressed(byte_offset: u64) -> StreamPosition {
        StreamPosition {
            byte_offset,
            block_offset: None,
        }
    }

    pub fn compressed(byte_offset: u64, block_offset: usize) -> StreamPosition {
        StreamPosition {
            byte_offset,
            block_offset: Some(block_offset),
        }
    }

    /// Pops a position from `provider`: the byte offset, then the block offset when
    /// `compressed` is set.
    pub fn from_provider(
        provider: &mut PositionProvider<'_>,
        compressed: bool,
    ) -> Result<StreamPosition> {
        let byte_offset = provider.pop("stream byte offset")?;
        if !compressed {
            return Ok(StreamPosition::uncompressed(byte_offset));
        }
        let block_offset = provider.pop("decompressed block offset")?;
        let block_offset = usize::try_from(block_offset)
            .map_err(|_| Error::seek_out_of_range(block_offset, usize::MAX as u64))?;
        Ok(StreamPosition::compressed(byte_offset, block_offset))
    }
}

/// Ordered cursor over the positions of a row-index entry.
///
/// An entry lists the positions of every stream of a column back to back (and the
/// run offsets of their decoders), so each consumer pops the values it owns in turn.
#[derive(Debug, Clone)]
pub struct PositionProvider<'a> {
    positions: &'a [u64],
    next: usize,
}

impl<'a> PositionProvider<'a> {
    pub fn new(positions: &'a [u64]) -> Self {
        PositionProvider { positions, next: 0 }
    }

    /// Returns the next position, failing when the entry has no values left.
    pub fn pop(&mut self, expected: &'static str) -> Result<u64> {
        match self.positions.get(self.next) {
            Some(&value) => {
                self.next += 1;
                Ok(value)
            }
            None => {
                log::error!("Not enough position offset to skip, missing {expected}");
                Err(Error::positions_exhausted(expected))
            }
        }
    }

    /// Number of positions not yet consumed.
    pub fn remaining(&self) -> usize {
        self.positions.len() - self.next
    }
}

#[cfg(test)]
mod tests {
    use orcstream_common::error::ErrorKind;

    use super::{PositionProvider, StreamPosition};

    #[test]
    fn test_uncompressed_pops_one_value() {
        let positions = [120, 7, 3];
        let mut provider = PositionProvider::new(&positions);
        let position = StreamPosition::from_provider(&mut provider, false).unwrap();
        assert_eq!(position, StreamPosition::uncompressed(120));
        assert_eq!(provider.remaining(), 2);
    }

    #[test]
    fn test_compressed_pops_two_values() {
        let positions = [120, 7, 3];
        let mut provider = PositionProvider::new(&positions);
        let position = StreamPosition::from_provider(&mut provider, true).unwrap();
        assert_eq!(position, StreamPosition::compressed(120, 7));
        assert_eq!(provider.pop("run offset").unwrap(), 3);
        assert_eq!(provider.remaining(), 0);
    }

    #[test]
    fn test_missing_block_offset() {
        let positions = [120];
        let mut provider = PositionProvider::new(&positions);
        let err = StreamPosition::from_provider(&mut provider, true).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::PositionsExhausted {
                expected: "decompressed block offset"
            }
        ));
    }
}
