//! Byte-stream layer for reading ORC-style, block-compressed column streams.
//!
//! Two layers turn a region of a shared file into the logical bytes consumed by
//! column decoders:
//!
//! - [`RawWindowBuffer`]: a bounded, refillable window over `[start, end)` of a
//!   [`SharedFile`]. Reads hand out slices borrowed from the window.
//! - [`BlockCompressedStream`]: either a pass-through over the window (no compression)
//!   or a decoder of self-framed blocks, each prefixed by a 3-byte [`BlockHeader`]
//!   and either stored literally or compressed with the stream's codec.
//!
//! Seeking uses ORC row-index positions: a byte offset relative to the start of the
//! stream, followed (for compressed streams) by an offset into the decompressed
//! block, see [`StreamPosition`] and [`PositionProvider`].
//!
//! # Example
//!
//! ```no_run
//! use orcstream::{BlockCompressedStream, CompressionKind, SharedFile, StreamDescriptor};
//!
//! # fn main() -> orcstream_common::Result<()> {
//! let file = SharedFile::open("data.orc")?;
//! let descriptor = StreamDescriptor::new(3..4096, CompressionKind::Zlib, 256 * 1024);
//! let mut stream = BlockCompressedStream::new(file, &descriptor)?;
//! while !stream.eof() {
//!     let byte = stream.read_byte()?;
//!     println!("{byte:02x}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod block_header;
pub mod block_stream;
pub mod options;
pub mod position;
pub mod window_buffer;

pub use block_header::{BLOCK_HEADER_SIZE, BlockHeader};
pub use block_stream::BlockCompressedStream;
pub use options::{StreamDescriptor, StreamOptions};
pub use orcstream_compression::CompressionKind;
pub use orcstream_io::SharedFile;
pub use position::{PositionProvider, StreamPosition};
pub use window_buffer::RawWindowBuffer;
