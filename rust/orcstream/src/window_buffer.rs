//! Bounded, refillable window over a region of a shared file.

use std::{
    fs::File,
    io::{Read, Seek},
    ops::Range,
};

use orcstream_common::{Result, error::Error, verify_arg};
use orcstream_io::SharedFile;

/// A refillable byte window over the region `[start, end)` of a [`SharedFile`].
///
/// The window holds up to `capacity` bytes. Reads consume bytes from the window and
/// refill it from the file on demand, discarding the consumed prefix first. The
/// buffer never reads outside its region.
///
/// ```text
///            region_start                                 region_end
/// file:           |=========================================|
///                        ^ window start     ^ next_fill_offset
/// window:                [consumed|unread  ]
///                        0        ^cursor   ^valid_len       ^capacity
/// ```
///
/// Slices returned by [`read`](Self::read) and [`read_remaining`](Self::read_remaining)
/// borrow the window and must be copied before the next call that may refill it.
///
/// Several buffers can read disjoint regions of one file: every refill reads at an
/// explicit offset through [`SharedFile::read_at`], which repositions the shared
/// cursor only when a sibling buffer has moved it.
pub struct RawWindowBuffer<F = File> {
    file: SharedFile<F>,
    /// Absolute offset of the first byte of the region
    region_start: u64,
    /// Absolute offset one past the last byte of the region
    region_end: u64,
    /// Absolute offset of the first byte not yet pulled into the window
    next_fill_offset: u64,
    /// Window memory; its length is the window capacity
    buf: Vec<u8>,
    /// Number of bytes of `buf` holding file data
    valid_len: usize,
    /// Position of the next unread byte in `buf`
    read_cursor: usize,
}

impl<F: Read + Seek> RawWindowBuffer<F> {
    /// Creates a window over `region` of `file` with room for `capacity` bytes.
    ///
    /// No data is read until the first read or seek.
    pub fn new(file: SharedFile<F>, region: Range<u64>, capacity: usize) -> Result<Self> {
        verify_arg!(region, region.start <= region.end);
        verify_arg!(capacity, capacity > 0);
        Ok(RawWindowBuffer {
            file,
            region_start: region.start,
            region_end: region.end,
            next_fill_offset: region.start,
            buf: vec![0u8; capacity],
            valid_len: 0,
            read_cursor: 0,
        })
    }

    /// Rebinds the window to a new region of the same file, discarding its content.
    ///
    /// The capacity grows to `min_capacity` if it is smaller and is kept otherwise.
    pub fn reset(&mut self, region: Range<u64>, min_capacity: usize) -> Result<()> {
        verify_arg!(region, region.start <= region.end);
        if self.buf.len() < min_capacity {
            log::debug!(
                "growing window buffer from {} to {min_capacity} bytes",
                self.buf.len()
            );
            self.buf.resize(min_capacity, 0);
        }
        self.region_start = region.start;
        self.region_end = region.end;
        self.next_fill_offset = region.start;
        self.valid_len = 0;
        self.read_cursor = 0;
        Ok(())
    }

    /// Rebinds the window to a region of another file.
    pub fn reset_with_file(
        &mut self,
        file: SharedFile<F>,
        region: Range<u64>,
        min_capacity: usize,
    ) -> Result<()> {
        self.reset(region, min_capacity)?;
        self.file = file;
        Ok(())
    }

    /// Moves the unread bytes to the front of the window and fills the free space
    /// from the file.
    ///
    /// Returns the number of bytes added, which is zero when the region is exhausted
    /// or the window is already full. Reading fewer bytes than the region promises is
    /// an error.
    pub fn refill(&mut self) -> Result<usize> {
        if self.next_fill_offset >= self.region_end {
            return Ok(0);
        }

        if self.read_cursor > 0 {
            self.buf.copy_within(self.read_cursor..self.valid_len, 0);
            self.valid_len -= self.read_cursor;
            self.read_cursor = 0;
        }

        let free = self.buf.len() - self.valid_len;
        let want = (self.region_end - self.next_fill_offset).min(free as u64) as usize;
        if want == 0 {
            return Ok(0);
        }

        let offset = self.next_fill_offset;
        let target = &mut self.buf[self.valid_len..self.valid_len + want];
        let read = self.file.read_at(offset, target).map_err(|e| {
            log::error!("Error occurred while reading file at offset {offset}: {e}");
            Error::io(format!("window refill at offset {offset}"), e)
        })?;
        if read != want {
            log::error!(
                "Error occurred while reading file: expected {want} bytes at offset {offset}, got {read}"
            );
            return Err(Error::short_read("window refill", offset, want, read));
        }

        self.valid_len += want;
        self.next_fill_offset += want as u64;
        Ok(want)
    }

    /// Reads up to `len` bytes.
    ///
    /// Refills the window once if it holds fewer than `len` unread bytes. Fails if
    /// that refill adds nothing; otherwise the result is capped to the available bytes,
    /// so a short slice means the region (or the window capacity) ended first.
    pub fn read(&mut self, len: usize) -> Result<&[u8]> {
        let range = self.read_range(len)?;
        Ok(&self.buf[range])
    }

    /// Same as [`read`](Self::read), but returns the location of the bytes within
    /// the window instead of borrowing them.
    pub(crate) fn read_range(&mut self, len: usize) -> Result<Range<usize>> {
        if len > self.resident() {
            if self.refill()? == 0 {
                log::error!(
                    "Cannot read {len} bytes at offset {}: {} bytes resident, {} bytes left in region",
                    self.position(),
                    self.resident(),
                    self.region_end - self.next_fill_offset
                );
                return Err(Error::short_read(
                    "window read",
                    self.position(),
                    len,
                    self.resident(),
                ));
            }
        }

        let len = len.min(self.resident());
        let start = self.read_cursor;
        self.read_cursor += len;
        Ok(start..start + len)
    }

    pub fn read_byte(&mut self) -> Result<u8> {
        if self.read_cursor >= self.valid_len {
            self.refill()?;
            if self.read_cursor >= self.valid_len {
                log::error!("Cannot read a byte at offset {}: region exhausted", self.position());
                return Err(Error::short_read("window read_byte", self.position(), 1, 0));
            }
        }
        let value = self.buf[self.read_cursor];
        self.read_cursor += 1;
        Ok(value)
    }

    /// Unread bytes in the region: not yet loaded plus loaded but unread.
    pub fn bytes_left(&self) -> u64 {
        (self.region_end - self.next_fill_offset) + self.resident() as u64
    }

    /// Reads and consumes every unread byte of the region.
    ///
    /// If the remaining bytes do not fit, the window grows to exactly their size, so
    /// the allocation is bounded only by the region length.
    pub fn read_remaining(&mut self) -> Result<&[u8]> {
        let remaining = self.bytes_left();
        if remaining == 0 {
            return Ok(&[]);
        }

        let remaining = usize::try_from(remaining)
            .map_err(|_| Error::invalid_arg("region", format!("{remaining} bytes left")))?;
        if remaining > self.buf.len() {
            log::debug!(
                "growing window buffer from {} to {remaining} bytes",
                self.buf.len()
            );
            self.buf.resize(remaining, 0);
        }

        self.refill()?;
        if self.resident() != remaining {
            log::error!(
                "Expected {remaining} remaining bytes in window, found {}",
                self.resident()
            );
            return Err(Error::short_read(
                "window read_remaining",
                self.position(),
                remaining,
                self.resident(),
            ));
        }

        let start = self.read_cursor;
        self.read_cursor = self.valid_len;
        Ok(&self.buf[start..self.valid_len])
    }

    /// Positions the window at the absolute file offset `offset`.
    ///
    /// A target inside the loaded window only moves the cursor. Otherwise the window
    /// is discarded and refilled starting at `offset`.
    pub fn seek(&mut self, offset: u64) -> Result<()> {
        if offset < self.region_start || offset > self.region_end {
            log::error!(
                "Seek offset {offset} outside of region {}..{}",
                self.region_start,
                self.region_end
            );
            return Err(Error::invalid_arg(
                "offset",
                format!(
                    "{offset} outside of region {}..{}",
                    self.region_start, self.region_end
                ),
            ));
        }

        let window_start = self.next_fill_offset - self.valid_len as u64;
        if window_start <= offset && offset < self.next_fill_offset {
            self.read_cursor = self.valid_len - (self.next_fill_offset - offset) as usize;
        } else {
            log::trace!("window seek to {offset} outside of {window_start}..{}", self.next_fill_offset);
            self.next_fill_offset = offset;
            self.valid_len = 0;
            self.read_cursor = 0;
            self.refill()?;
        }
        Ok(())
    }
}

impl<F> RawWindowBuffer<F> {
    /// Absolute file offset of the next byte a read would return.
    pub fn position(&self) -> u64 {
        self.next_fill_offset - self.resident() as u64
    }

    /// Absolute offset of the next byte not yet loaded into the window.
    pub fn next_fill_offset(&self) -> u64 {
        self.next_fill_offset
    }

    pub fn region(&self) -> Range<u64> {
        self.region_start..self.region_end
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub fn file(&self) -> &SharedFile<F> {
        &self.file
    }

    /// Loaded bytes not read yet.
    fn resident(&self) -> usize {
        self.valid_len - self.read_cursor
    }

    /// The whole window memory, used to resolve ranges from [`read_range`](Self::read_range).
    pub(crate) fn window(&self) -> &[u8] {
        &self.buf
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use orcstream_common::error::ErrorKind;
    use orcstream_io::SharedFile;

    use super::RawWindowBuffer;

    fn create_test_data(size: usize) -> Vec<u8> {
        (0..size).map(|i| (i * 7 % 256) as u8).collect()
    }

    fn create_buffer(
        data: &[u8],
        region: std::ops::Range<u64>,
        capacity: usize,
    ) -> RawWindowBuffer<Cursor<Vec<u8>>> {
        let file = SharedFile::new(Cursor::new(data.to_vec()));
        RawWindowBuffer::new(file, region, capacity).unwrap()
    }

    #[test]
    fn test_sequential_reads_cover_region() {
        let data = create_test_data(300);
        let mut buffer = create_buffer(&data, 50..250, 64);

        let mut collected = Vec::new();
        // A short tail fails once the region is exhausted, so ask for at most what is left.
        while buffer.bytes_left() > 0 {
            let chunk = buffer.read(24usize.min(buffer.bytes_left() as usize)).unwrap();
            assert!(!chunk.is_empty());
            collected.extend_from_slice(chunk);
        }
        assert_eq!(&collected[..], &data[50..250]);
        assert!(buffer.read(1).is_err());
    }

    #[test]
    fn test_read_caps_at_region_end() {
        let data = create_test_data(100);
        let mut buffer = create_buffer(&data, 0..100, 64);

        assert_eq!(buffer.read(64).unwrap(), &data[..64]);
        assert_eq!(buffer.bytes_left(), 36);
        assert_eq!(buffer.read(64).unwrap(), &data[64..100]);
        assert_eq!(buffer.bytes_left(), 0);
    }

    #[test]
    fn test_read_larger_than_full_window_fails() {
        let data = create_test_data(100);
        let mut buffer = create_buffer(&data, 0..100, 16);
        buffer.refill().unwrap();
        let err = buffer.read(32).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::ShortRead {
                expected: 32,
                actual: 16,
                ..
            }
        ));
    }

    #[test]
    fn test_read_past_exhausted_region_fails() {
        let data = create_test_data(300);
        let mut buffer = create_buffer(&data, 50..250, 64);
        for _ in 0..8 {
            buffer.read(24).unwrap();
        }
        assert_eq!(buffer.bytes_left(), 8);
        let err = buffer.read(24).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::ShortRead {
                expected: 24,
                actual: 8,
                ..
            }
        ));
        assert_eq!(buffer.read(8).unwrap(), &data[242..250]);
    }

    #[test]
    fn test_read_zero_bytes() {
        let data = create_test_data(10);
        let mut buffer = create_buffer(&data, 10..10, 16);
        assert!(buffer.read(0).unwrap().is_empty());
        assert!(buffer.read_byte().is_err());
    }

    #[test]
    fn test_read_byte() {
        let data = create_test_data(40);
        let mut buffer = create_buffer(&data, 5..40, 8);
        for expected in &data[5..40] {
            assert_eq!(buffer.read_byte().unwrap(), *expected);
        }
        assert_eq!(buffer.bytes_left(), 0);
        assert!(buffer.read_byte().is_err());
    }

    #[test]
    fn test_sequential_reads_match_read_remaining() {
        let data = create_test_data(2000);
        for _ in 0..50 {
            let start = fastrand::u64(0..2000);
            let end = fastrand::u64(start..=2000);
            let capacity = fastrand::usize(1..300);
            let chunk = fastrand::usize(1..=capacity);

            let mut sequential = create_buffer(&data, start..end, capacity);
            let mut collected = Vec::new();
            while sequential.bytes_left() > 0 {
                let len = chunk.min(sequential.bytes_left() as usize);
                collected.extend_from_slice(sequential.read(len).unwrap());
            }

            let mut whole = create_buffer(&data, start..end, capacity);
            let remaining = whole.read_remaining().unwrap().to_vec();
            assert_eq!(collected, remaining);
            assert_eq!(&remaining[..], &data[start as usize..end as usize]);
            assert_eq!(whole.bytes_left(), 0);
        }
    }

    #[test]
    fn test_read_remaining_grows_window() {
        let data = create_test_data(500);
        let mut buffer = create_buffer(&data, 0..500, 64);
        assert_eq!(buffer.read(10).unwrap(), &data[..10]);

        let remaining = buffer.read_remaining().unwrap();
        assert_eq!(remaining, &data[10..500]);
        assert_eq!(buffer.capacity(), 490);
        assert!(buffer.read_remaining().unwrap().is_empty());
    }

    #[test]
    fn test_read_remaining_within_capacity() {
        let data = create_test_data(100);
        let mut buffer = create_buffer(&data, 20..60, 64);
        assert_eq!(buffer.read(5).unwrap(), &data[20..25]);
        assert_eq!(buffer.read_remaining().unwrap(), &data[25..60]);
        assert_eq!(buffer.capacity(), 64);
        assert_eq!(buffer.bytes_left(), 0);
    }

    #[test]
    fn test_seek_within_window() {
        let data = create_test_data(200);
        let mut buffer = create_buffer(&data, 0..200, 64);
        buffer.read(40).unwrap();
        let fill_offset = buffer.next_fill_offset();
        let repositions = buffer.file().reposition_count();

        buffer.seek(10).unwrap();
        assert_eq!(buffer.next_fill_offset(), fill_offset);
        assert_eq!(buffer.position(), 10);
        assert_eq!(buffer.read(5).unwrap(), &data[10..15]);

        buffer.seek(63).unwrap();
        assert_eq!(buffer.read_byte().unwrap(), data[63]);
        assert_eq!(buffer.file().reposition_count(), repositions);
    }

    #[test]
    fn test_seek_outside_window() {
        let data = create_test_data(200);
        let mut buffer = create_buffer(&data, 0..200, 64);
        buffer.read(10).unwrap();

        buffer.seek(150).unwrap();
        assert_eq!(buffer.position(), 150);
        assert_eq!(buffer.next_fill_offset(), 200);
        assert_eq!(buffer.read(50).unwrap(), &data[150..200]);

        // Backwards, before the current window.
        buffer.seek(3).unwrap();
        assert_eq!(buffer.read(4).unwrap(), &data[3..7]);
        assert_eq!(buffer.bytes_left(), 193);
    }

    #[test]
    fn test_seek_outside_region_fails() {
        let data = create_test_data(200);
        let mut buffer = create_buffer(&data, 10..100, 64);
        assert!(buffer.seek(5).is_err());
        assert!(buffer.seek(101).is_err());
        buffer.seek(100).unwrap();
        assert_eq!(buffer.bytes_left(), 0);
    }

    #[test]
    fn test_short_file_is_an_error() {
        let data = create_test_data(50);
        let mut buffer = create_buffer(&data, 0..80, 128);
        let err = buffer.read(10).unwrap_err();
        assert!(err.is_io());
        assert!(matches!(
            err.kind(),
            ErrorKind::ShortRead {
                expected: 80,
                actual: 50,
                ..
            }
        ));
    }

    #[test]
    fn test_sibling_buffers_share_file() {
        let data = create_test_data(400);
        let file = SharedFile::new(Cursor::new(data.clone()));
        let mut first = RawWindowBuffer::new(file.clone(), 0..200, 32).unwrap();
        let mut second = RawWindowBuffer::new(file.clone(), 200..400, 32).unwrap();

        let mut first_bytes = Vec::new();
        let mut second_bytes = Vec::new();
        while first.bytes_left() > 0 || second.bytes_left() > 0 {
            if first.bytes_left() > 0 {
                first_bytes.extend_from_slice(first.read(20).unwrap());
            }
            if second.bytes_left() > 0 {
                second_bytes.extend_from_slice(second.read(20).unwrap());
            }
        }
        assert_eq!(&first_bytes[..], &data[..200]);
        assert_eq!(&second_bytes[..], &data[200..]);
        assert!(file.reposition_count() > 0);
    }

    #[test]
    fn test_reset_reuses_window() {
        let data = create_test_data(300);
        let mut buffer = create_buffer(&data, 0..100, 32);
        buffer.read(20).unwrap();

        buffer.reset(200..300, 16).unwrap();
        assert_eq!(buffer.capacity(), 32);
        assert_eq!(buffer.position(), 200);
        assert_eq!(buffer.read(10).unwrap(), &data[200..210]);

        buffer.reset(100..200, 128).unwrap();
        assert_eq!(buffer.capacity(), 128);
        assert_eq!(buffer.read_remaining().unwrap(), &data[100..200]);

        assert!(buffer.reset(50..10, 16).is_err());
    }

    #[test]
    fn test_invalid_construction() {
        let file = SharedFile::new(Cursor::new(create_test_data(10)));
        assert!(RawWindowBuffer::new(file.clone(), 5..2, 16).is_err());
        assert!(RawWindowBuffer::new(file, 0..10, 0).is_err());
    }
}
