use std::{
    cell::RefCell,
    fs::File,
    io::{Read, Seek, SeekFrom},
    path::Path,
    rc::Rc,
};

use crate::{utils::read_fully, verify};

/// A seekable file handle that can be shared by several readers on one thread.
///
/// ORC stripes keep every column stream in the same file, so the stream readers of
/// one stripe share a single handle and therefore a single OS cursor. `SharedFile`
/// makes that cursor explicit: [`read_at`](SharedFile::read_at) queries the current
/// position first and seeks only if another reader left the cursor elsewhere.
///
/// Cloning is cheap and yields another handle to the same underlying file. The file
/// is closed when the last clone is dropped.
///
/// `SharedFile` is not `Send`. Reads from all clones happen on one thread.
pub struct SharedFile<F = File> {
    inner: Rc<RefCell<FileState<F>>>,
}

struct FileState<F> {
    file: F,
    /// Cached size of the file
    size: Option<u64>,
    /// Number of times a read had to move the cursor
    repositions: u64,
}

impl SharedFile<File> {
    pub fn open<P: AsRef<Path>>(path: P) -> std::io::Result<SharedFile<File>> {
        Ok(SharedFile::new(File::open(path)?))
    }
}

impl<F> SharedFile<F> {
    pub fn new(file: F) -> SharedFile<F> {
        SharedFile {
            inner: Rc::new(RefCell::new(FileState {
                file,
                size: None,
                repositions: 0,
            })),
        }
    }

    /// Returns how many reads found the cursor away from their start offset and
    /// had to seek before reading.
    pub fn reposition_count(&self) -> u64 {
        self.inner.borrow().repositions
    }

    /// Returns the number of live handles sharing this file.
    pub fn handle_count(&self) -> usize {
        Rc::strong_count(&self.inner)
    }

    /// Returns `true` if both handles refer to the same underlying file.
    pub fn same_file(&self, other: &SharedFile<F>) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<F: Read + Seek> SharedFile<F> {
    /// Returns the size of the underlying file.
    pub fn size(&self) -> std::io::Result<u64> {
        let mut state = self.inner.borrow_mut();
        if let Some(size) = state.size {
            return Ok(size);
        }
        let pos = state.file.stream_position()?;
        let size = state.file.seek(SeekFrom::End(0))?;
        state.file.seek(SeekFrom::Start(pos))?;
        state.size = Some(size);
        Ok(size)
    }

    /// Returns the current position of the shared cursor.
    pub fn position(&self) -> std::io::Result<u64> {
        self.inner.borrow_mut().file.stream_position()
    }

    /// Reads into `buf` starting at the absolute offset `pos`.
    ///
    /// The cursor is moved to `pos` only when it is somewhere else. Reading continues
    /// until `buf` is full or end-of-file is reached; the number of bytes read is
    /// returned and a value smaller than `buf.len()` means the file ended early.
    pub fn read_at(&self, pos: u64, buf: &mut [u8]) -> std::io::Result<usize> {
        verify!(pos.checked_add(buf.len() as u64).is_some());
        let mut state = self.inner.borrow_mut();
        let current = state.file.stream_position()?;
        if current != pos {
            log::trace!("repositioning shared file cursor from {current} to {pos}");
            state.file.seek(SeekFrom::Start(pos))?;
            state.repositions += 1;
        }
        read_fully(&mut state.file, buf)
    }
}

impl<F> Clone for SharedFile<F> {
    fn clone(&self) -> Self {
        SharedFile {
            inner: self.inner.clone(),
        }
    }
}

impl<F> std::fmt::Debug for SharedFile<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedFile")
            .field("handles", &self.handle_count())
            .field("repositions", &self.reposition_count())
            .finish()
    }
}
