//! Logical byte stream over a possibly block-compressed file region.

use std::{
    fs::File,
    io::{Read, Seek},
    ops::Range,
};

use orcstream_common::{Result, error::Error, verify_arg, verify_data};
use orcstream_compression::{BlockDecompressor, CompressionKind, create_decompressor};
use orcstream_io::SharedFile;

use crate::{
    BLOCK_HEADER_SIZE, BlockHeader,
    options::{StreamDescriptor, StreamOptions},
    position::{PositionProvider, StreamPosition},
    window_buffer::RawWindowBuffer,
};

/// Where the bytes of the current block live.
#[derive(Debug, Clone, PartialEq, Eq)]
enum DecodedSource {
    /// A stored block, read in place from the raw window.
    Window(Range<usize>),
    /// A compressed block, decoded into the stream's own output buffer.
    Decompressed,
}

/// Reads the logical bytes of one ORC stream.
///
/// Without compression the stream passes reads straight through to its
/// [`RawWindowBuffer`]. With a codec, the region is a sequence of blocks, each
/// starting with a 3-byte [`BlockHeader`]. A block is loaded when the previous one
/// is exhausted: stored blocks are served directly from the raw window, compressed
/// ones are decoded into an output buffer of `block_capacity` bytes.
///
/// A read that crosses a block boundary is stitched from the tail of the current
/// block and the head of the next one. A single read cannot span more than two
/// blocks.
///
/// Returned slices borrow the stream and must be copied before the next read.
pub struct BlockCompressedStream<F = File> {
    buffer: RawWindowBuffer<F>,
    compression: CompressionKind,
    /// `None` for pass-through streams.
    decompressor: Option<Box<dyn BlockDecompressor>>,
    options: StreamOptions,
    /// Largest decoded block accepted. Never shrinks.
    block_capacity: usize,
    decoded: DecodedSource,
    decoded_len: usize,
    decoded_cursor: usize,
    block_is_stored: bool,
    /// Codec output.
    decompressed: Vec<u8>,
    /// Stitched reads and drained remainders.
    scratch: Vec<u8>,
    stream_start: u64,
    /// Absolute offset of the header of the loaded block.
    current_block_offset: Option<u64>,
    current_header: Option<BlockHeader>,
    blocks_loaded: u64,
    blocks_decompressed: u64,
}

impl<F: Read + Seek> BlockCompressedStream<F> {
    pub fn new(file: SharedFile<F>, descriptor: &StreamDescriptor) -> Result<Self> {
        Self::with_options(file, descriptor, StreamOptions::default())
    }

    pub fn with_options(
        file: SharedFile<F>,
        descriptor: &StreamDescriptor,
        options: StreamOptions,
    ) -> Result<Self> {
        let buffer_size = descriptor.buffer_size(&options);
        let buffer = RawWindowBuffer::new(file, descriptor.range.clone(), buffer_size)?;
        let decompressor = create_decompressor(descriptor.compression)?;
        let scratch = Vec::with_capacity(options.initial_scratch_size);
        Ok(BlockCompressedStream {
            buffer,
            compression: descriptor.compression,
            decompressor,
            options,
            block_capacity: buffer_size,
            decoded: DecodedSource::Decompressed,
            decoded_len: 0,
            decoded_cursor: 0,
            block_is_stored: false,
            decompressed: Vec::new(),
            scratch,
            stream_start: descriptor.range.start,
            current_block_offset: None,
            current_header: None,
            blocks_loaded: 0,
            blocks_decompressed: 0,
        })
    }

    /// Replaces the codec of a compressed stream, e.g. with an instrumented or
    /// hardware-backed implementation of the same format.
    pub fn with_decompressor(mut self, decompressor: Box<dyn BlockDecompressor>) -> Result<Self> {
        verify_arg!(compression, self.compression.is_framed());
        verify_arg!(decompressor, decompressor.kind() == self.compression);
        self.decompressor = Some(decompressor);
        Ok(self)
    }

    /// Rebinds the stream to another region of the same file.
    ///
    /// Buffers are reused; their capacities only grow.
    pub fn reset(&mut self, descriptor: &StreamDescriptor) -> Result<()> {
        self.reset_impl(None, descriptor)
    }

    /// Rebinds the stream to a region of another file.
    pub fn reset_with_file(
        &mut self,
        file: SharedFile<F>,
        descriptor: &StreamDescriptor,
    ) -> Result<()> {
        self.reset_impl(Some(file), descriptor)
    }

    fn reset_impl(
        &mut self,
        file: Option<SharedFile<F>>,
        descriptor: &StreamDescriptor,
    ) -> Result<()> {
        let block_capacity = self
            .block_capacity
            .max(descriptor.buffer_size(&self.options));
        let region = descriptor.range.clone();
        match file {
            Some(file) => self.buffer.reset_with_file(file, region, block_capacity)?,
            None => self.buffer.reset(region, block_capacity)?,
        }
        if descriptor.compression != self.compression {
            self.decompressor = create_decompressor(descriptor.compression)?;
            self.compression = descriptor.compression;
        }
        log::debug!(
            "stream reset to {:?}, compression {}, block capacity {block_capacity}",
            descriptor.range,
            self.compression
        );

        self.block_capacity = block_capacity;
        self.stream_start = descriptor.range.start;
        self.clear_block();
        Ok(())
    }

    /// Reads `len` bytes.
    ///
    /// Without compression this is [`RawWindowBuffer::read`], including its partial
    /// read at the end of the region. With compression the full `len` bytes are
    /// returned or the read fails; a zero-length read returns an empty slice and does
    /// not load a block.
    pub fn read(&mut self, len: usize) -> Result<&[u8]> {
        if !self.is_framed() {
            return self.buffer.read(len);
        }
        if len == 0 {
            return Ok(&[]);
        }

        if self.decoded_cursor == self.decoded_len {
            self.load_next_block()?;
        }

        if len <= self.decoded_len - self.decoded_cursor {
            let start = self.decoded_cursor;
            self.decoded_cursor += len;
            let block = decoded_bytes(
                &self.decoded,
                self.decoded_len,
                self.buffer.window(),
                &self.decompressed,
            );
            return Ok(&block[start..start + len]);
        }

        self.read_across_blocks(len)
    }

    /// Stitches the tail of the current block and the head of the next one.
    fn read_across_blocks(&mut self, len: usize) -> Result<&[u8]> {
        let tail = self.decoded_len - self.decoded_cursor;
        self.scratch.clear();
        self.scratch.extend_from_slice(
            &decoded_bytes(
                &self.decoded,
                self.decoded_len,
                self.buffer.window(),
                &self.decompressed,
            )[self.decoded_cursor..],
        );
        self.decoded_cursor = self.decoded_len;

        self.load_next_block()?;

        let head = len - tail;
        if head > self.decoded_len {
            log::error!(
                "Requested data size exceeds compression block size: requested {len}, \
                 {tail} bytes left in block, next block holds {}",
                self.decoded_len
            );
            return Err(Error::read_spans_blocks(len, tail + self.decoded_len));
        }

        self.scratch.extend_from_slice(
            &decoded_bytes(
                &self.decoded,
                self.decoded_len,
                self.buffer.window(),
                &self.decompressed,
            )[..head],
        );
        self.decoded_cursor = head;
        Ok(&self.scratch)
    }

    pub fn read_byte(&mut self) -> Result<u8> {
        if !self.is_framed() {
            return self.buffer.read_byte();
        }

        if self.decoded_cursor == self.decoded_len {
            self.load_next_block()?;
        }
        if self.decoded_cursor >= self.decoded_len {
            log::error!(
                "Cannot read a byte: block at {:?} decoded to {} bytes",
                self.current_block_offset,
                self.decoded_len
            );
            return Err(Error::short_read(
                "stream read_byte",
                self.buffer.position(),
                1,
                0,
            ));
        }

        let block = decoded_bytes(
            &self.decoded,
            self.decoded_len,
            self.buffer.window(),
            &self.decompressed,
        );
        let value = block[self.decoded_cursor];
        self.decoded_cursor += 1;
        Ok(value)
    }

    /// Reads and consumes everything left in the stream.
    ///
    /// With compression, the rest of the current block and every following block are
    /// concatenated. An exhausted stream yields an empty slice.
    pub fn read_remaining(&mut self) -> Result<&[u8]> {
        if !self.is_framed() {
            return self.buffer.read_remaining();
        }

        if self.decoded_cursor == self.decoded_len {
            if self.buffer.bytes_left() == 0 {
                return Ok(&[]);
            }
            self.load_next_block()?;
        }

        if self.buffer.bytes_left() == 0 {
            let start = self.decoded_cursor;
            self.decoded_cursor = self.decoded_len;
            let block = decoded_bytes(
                &self.decoded,
                self.decoded_len,
                self.buffer.window(),
                &self.decompressed,
            );
            return Ok(&block[start..]);
        }

        self.scratch.clear();
        self.scratch.extend_from_slice(
            &decoded_bytes(
                &self.decoded,
                self.decoded_len,
                self.buffer.window(),
                &self.decompressed,
            )[self.decoded_cursor..],
        );
        self.decoded_cursor = self.decoded_len;

        while self.buffer.bytes_left() > 0 {
            self.load_next_block()?;
            self.scratch.extend_from_slice(decoded_bytes(
                &self.decoded,
                self.decoded_len,
                self.buffer.window(),
                &self.decompressed,
            ));
            self.decoded_cursor = self.decoded_len;
        }
        Ok(&self.scratch)
    }

    /// Returns `true` when the current block and the raw region are both exhausted.
    pub fn eof(&self) -> bool {
        self.decoded_cursor == self.decoded_len && self.buffer.bytes_left() == 0
    }

    /// Reads the next block header and makes the block's decoded bytes current.
    fn load_next_block(&mut self) -> Result<()> {
        self.clear_block();
        let block_offset = self.buffer.position();
        self.current_block_offset = Some(block_offset);

        let left = self.buffer.bytes_left();
        if left == 0 {
            log::error!("Error reading compressed stream header: no bytes left at offset {block_offset}");
            return Err(Error::short_read(
                "block header",
                block_offset,
                BLOCK_HEADER_SIZE,
                0,
            ));
        }
        if left < BLOCK_HEADER_SIZE as u64 {
            log::error!("Truncated block header at offset {block_offset}: {left} bytes");
            return Err(Error::invalid_format(
                "block header",
                format!("{left} of {BLOCK_HEADER_SIZE} bytes at offset {block_offset}"),
            ));
        }
        let header_range = self.buffer.read_range(BLOCK_HEADER_SIZE)?;
        let header = BlockHeader::from_slice(&self.buffer.window()[header_range])?;
        self.current_header = Some(header);

        if header.length > self.block_capacity {
            log::error!(
                "Buffer size too small. size = {} needed = {}",
                self.block_capacity,
                header.length
            );
            return Err(Error::block_too_large(header.length, self.block_capacity));
        }

        let payload_offset = block_offset + BLOCK_HEADER_SIZE as u64;
        if self.buffer.bytes_left() < header.length as u64 {
            log::error!(
                "Chunk of length {} couldn't be read from offset {payload_offset}: {} bytes left",
                header.length,
                self.buffer.bytes_left()
            );
            return Err(Error::short_read(
                "block payload",
                payload_offset,
                header.length,
                self.buffer.bytes_left() as usize,
            ));
        }
        let payload = self.buffer.read_range(header.length)?;
        verify_data!(payload, payload.len() == header.length);

        self.blocks_loaded += 1;
        if header.stored {
            log::trace!(
                "loaded stored block at {block_offset}, {} bytes",
                header.length
            );
            self.decoded = DecodedSource::Window(payload);
            self.decoded_len = header.length;
            self.block_is_stored = true;
            return Ok(());
        }

        let Some(decompressor) = self.decompressor.as_deref() else {
            return Err(Error::invalid_arg(
                "compression",
                "block framing requires a decompressor",
            ));
        };
        if self.decompressed.len() < self.block_capacity {
            self.decompressed.resize(self.block_capacity, 0);
        }
        let output = &mut self.decompressed[..self.block_capacity];
        let decoded_len = decompressor
            .decompress(&self.buffer.window()[payload.clone()], output)
            .inspect_err(|e| {
                log::error!(
                    "Error occurred while decompressing {} block at offset {block_offset} \
                     ({} compressed bytes): {e}",
                    self.compression,
                    payload.len()
                )
            })?;
        log::trace!(
            "decompressed block at {block_offset}: {} -> {decoded_len} bytes",
            payload.len()
        );

        self.blocks_decompressed += 1;
        self.decoded = DecodedSource::Decompressed;
        self.decoded_len = decoded_len;
        Ok(())
    }

    /// Drops the rest of the current block and loads the next one.
    ///
    /// Returns `false` once the region holds no further blocks. Only valid for
    /// compressed streams.
    pub fn next_block(&mut self) -> Result<bool> {
        verify_arg!(compression, self.is_framed());
        self.clear_block();
        if self.buffer.bytes_left() == 0 {
            return Ok(false);
        }
        self.load_next_block()?;
        Ok(true)
    }

    /// Positions the stream at `position`, relative to the start of the stream.
    ///
    /// With compression, `byte_offset` must point at a block header. If that block is
    /// already loaded only the cursor moves; otherwise the block is read and decoded.
    /// `block_offset` must fall inside the decoded block. Without compression
    /// `block_offset` is ignored.
    pub fn seek(&mut self, position: StreamPosition) -> Result<()> {
        let region = self.buffer.region();
        let absolute = self
            .stream_start
            .checked_add(position.byte_offset)
            .filter(|&offset| offset <= region.end)
            .ok_or_else(|| {
                log::error!(
                    "Seek offset {} exceeds stream length {}",
                    position.byte_offset,
                    region.end - region.start
                );
                Error::seek_out_of_range(position.byte_offset, region.end - region.start)
            })?;

        if !self.is_framed() {
            log::trace!("seek to {absolute}");
            return self.buffer.seek(absolute);
        }

        let Some(block_offset) = position.block_offset else {
            return Err(Error::invalid_arg(
                "block_offset",
                "required when seeking in a compressed stream",
            ));
        };

        if self.current_block_offset != Some(absolute) {
            log::trace!("seek to block at {absolute}, offset {block_offset}");
            self.clear_block();
            self.buffer.seek(absolute)?;
            self.load_next_block()?;
        }

        if block_offset >= self.decoded_len {
            log::error!(
                "Not enough bytes to skip in the uncompressed stream: offset {block_offset}, \
                 block length {}",
                self.decoded_len
            );
            return Err(Error::seek_out_of_range(
                block_offset as u64,
                self.decoded_len as u64,
            ));
        }
        self.decoded_cursor = block_offset;
        Ok(())
    }

    /// Pops this stream's position from a row-index entry and seeks to it.
    pub fn seek_to(&mut self, provider: &mut PositionProvider<'_>) -> Result<()> {
        let position = StreamPosition::from_provider(provider, self.is_framed())?;
        self.seek(position)
    }
}

impl<F> BlockCompressedStream<F> {
    pub fn compression(&self) -> CompressionKind {
        self.compression
    }

    pub fn block_capacity(&self) -> usize {
        self.block_capacity
    }

    /// Absolute offset that seek positions are relative to.
    pub fn stream_start(&self) -> u64 {
        self.stream_start
    }

    /// Absolute offset of the header of the loaded block, if any.
    pub fn current_block_offset(&self) -> Option<u64> {
        self.current_block_offset
    }

    /// Header of the loaded block, if any.
    pub fn current_block_header(&self) -> Option<BlockHeader> {
        self.current_header
    }

    /// Number of block headers read since the stream was created.
    pub fn blocks_loaded(&self) -> u64 {
        self.blocks_loaded
    }

    /// Number of codec invocations since the stream was created.
    pub fn blocks_decompressed(&self) -> u64 {
        self.blocks_decompressed
    }

    pub fn block_is_stored(&self) -> bool {
        self.block_is_stored
    }

    /// Unread bytes of the current block.
    pub fn decoded_remaining(&self) -> usize {
        self.decoded_len - self.decoded_cursor
    }

    pub fn buffer(&self) -> &RawWindowBuffer<F> {
        &self.buffer
    }

    fn is_framed(&self) -> bool {
        self.decompressor.is_some()
    }

    fn clear_block(&mut self) {
        self.decoded = DecodedSource::Decompressed;
        self.decoded_len = 0;
        self.decoded_cursor = 0;
        self.block_is_stored = false;
        self.current_block_offset = None;
        self.current_header = None;
    }
}

/// Resolves the current block without borrowing the whole stream, so callers can
/// copy from it into `scratch`.
fn decoded_bytes<'a>(
    decoded: &DecodedSource,
    decoded_len: usize,
    window: &'a [u8],
    decompressed: &'a [u8],
) -> &'a [u8] {
    match decoded {
        DecodedSource::Window(range) => &window[range.clone()],
        DecodedSource::Decompressed => &decompressed[..decoded_len],
    }
}
