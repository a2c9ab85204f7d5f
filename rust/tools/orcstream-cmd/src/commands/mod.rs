//! Command implementations for orcstream-cmd

use anyhow::{Context, Result};
use clap::Args;
use orcstream::{CompressionKind, SharedFile, StreamDescriptor, options::DEFAULT_BUFFER_SIZE};

use crate::utils::validate_file_exists;

pub mod blocks;
pub mod dump;

/// Location and encoding of the stream region to read.
#[derive(Args, Debug, Clone)]
pub struct RegionArgs {
    /// File holding the stream
    pub file: String,

    /// Absolute offset of the stream in the file
    #[arg(long, default_value_t = 0)]
    pub offset: u64,

    /// Length of the stream on disk (defaults to the rest of the file)
    #[arg(long)]
    pub length: Option<u64>,

    /// Compression codec of the stream: none, zlib, snappy, lz4, zstd
    #[arg(short, long, default_value_t = CompressionKind::None)]
    pub compression: CompressionKind,

    /// Compression block size from the file postscript
    #[arg(long, default_value_t = DEFAULT_BUFFER_SIZE)]
    pub block_size: usize,
}

impl RegionArgs {
    /// Opens the file and resolves the region against its size.
    pub fn open(&self) -> Result<(SharedFile, StreamDescriptor)> {
        validate_file_exists(&self.file)?;
        let file = SharedFile::open(&self.file)
            .with_context(|| format!("Failed to open {}", self.file))?;
        let size = file.size()?;
        if self.offset > size {
            anyhow::bail!("Offset {} is past the end of the file ({size} bytes)", self.offset);
        }

        let end = match self.length {
            Some(length) => self
                .offset
                .checked_add(length)
                .filter(|&end| end <= size)
                .with_context(|| {
                    format!(
                        "Region {}+{length} exceeds the file size ({size} bytes)",
                        self.offset
                    )
                })?,
            None => size,
        };
        log::debug!(
            "region {}..{end} of {}, compression {}",
            self.offset,
            self.file,
            self.compression
        );

        let descriptor = StreamDescriptor::new(self.offset..end, self.compression, self.block_size);
        Ok((file, descriptor))
    }
}
