//! I/O abstractions:
//! - `SharedFile`: a seekable file handle shared by several stream readers that
//!   read disjoint regions of the same file.
//!
//! The handle carries a single OS-level cursor. Instead of hiding that cursor
//! behind global state, every positioned read checks the current position and
//! repositions only when it differs from the requested offset.

pub mod file;
pub mod utils;

pub use file::SharedFile;
