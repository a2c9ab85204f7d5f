//! Stream configuration.

use std::ops::Range;

use orcstream_compression::CompressionKind;

use crate::BLOCK_HEADER_SIZE;

/// Window size used for streams without compression, and ORC's default
/// compression block size.
pub const DEFAULT_BUFFER_SIZE: usize = 256 * 1024;

/// Initial size of the buffer that stitches reads across block boundaries.
pub const DEFAULT_SCRATCH_SIZE: usize = 30;

/// Tunables shared by all streams created from the same reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamOptions {
    /// Window capacity used when the stream is not compressed. Compressed streams size
    /// their window by the compression block size instead.
    pub uncompressed_buffer_size: usize,
    /// Initial capacity of the stitching buffer. It grows on demand.
    pub initial_scratch_size: usize,
}

impl Default for StreamOptions {
    fn default() -> Self {
        StreamOptions {
            uncompressed_buffer_size: DEFAULT_BUFFER_SIZE,
            initial_scratch_size: DEFAULT_SCRATCH_SIZE,
        }
    }
}

impl StreamOptions {
    pub fn with_uncompressed_buffer_size(mut self, size: usize) -> Self {
        self.uncompressed_buffer_size = size;
        self
    }

    pub fn with_initial_scratch_size(mut self, size: usize) -> Self {
        self.initial_scratch_size = size;
        self
    }
}

/// Location and encoding of one stream inside a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamDescriptor {
    /// Absolute byte range of the stream in the file.
    pub range: Range<u64>,
    pub compression: CompressionKind,
    /// Compression block size from the file postscript. Bounds the decoded size of a
    /// block; ignored for uncompressed streams.
    pub block_size: usize,
}

impl StreamDescriptor {
    pub fn new(range: Range<u64>, compression: CompressionKind, block_size: usize) -> Self {
        StreamDescriptor {
            range,
            compression,
            block_size,
        }
    }

    pub fn uncompressed(range: Range<u64>) -> Self {
        StreamDescriptor::new(range, CompressionKind::None, DEFAULT_BUFFER_SIZE)
    }

    /// Length of the stream on disk.
    pub fn len(&self) -> u64 {
        self.range.end.saturating_sub(self.range.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of the raw window and of the largest accepted block for this stream.
    pub(crate) fn buffer_size(&self, options: &StreamOptions) -> usize {
        if self.compression.is_framed() {
            self.block_size.max(BLOCK_HEADER_SIZE)
        } else {
            options.uncompressed_buffer_size.max(1)
        }
    }
}
