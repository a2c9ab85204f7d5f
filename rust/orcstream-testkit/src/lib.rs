//! Test utilities for the orcstream crates.
//!
//! - [`blocks`]: frames payloads into ORC compressed-stream blocks.
//! - [`fixtures`]: payload generators and on-disk temporary files.
//!
//! Intended for test code and tooling only.

pub mod blocks;
pub mod fixtures;

pub use blocks::{BlockInfo, BlockStreamBuilder, compress_block, encode_header};
pub use fixtures::{compressible_payload, random_payload, write_temp_file};
