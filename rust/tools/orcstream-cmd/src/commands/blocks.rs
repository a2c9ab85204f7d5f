//! Blocks command implementation

use anyhow::{Context, Result};
use orcstream::BlockCompressedStream;

use crate::commands::RegionArgs;

/// One line of the block listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSummary {
    /// Header offset relative to the start of the stream
    pub offset: u64,
    pub stored: bool,
    pub payload_len: usize,
    pub decoded_len: usize,
}

pub fn run(region: RegionArgs) -> Result<()> {
    let blocks = list_blocks(&region)?;
    println!("{:>12}  {:>6}  {:>10}  {:>10}", "offset", "stored", "payload", "decoded");
    for block in &blocks {
        println!(
            "{:>12}  {:>6}  {:>10}  {:>10}",
            block.offset,
            if block.stored { "yes" } else { "no" },
            block.payload_len,
            block.decoded_len
        );
    }
    let decoded: usize = blocks.iter().map(|b| b.decoded_len).sum();
    println!("{} blocks, {decoded} decoded bytes", blocks.len());
    Ok(())
}

/// Walks the blocks of the region with the stream's own framing and decoding.
pub fn list_blocks(region: &RegionArgs) -> Result<Vec<BlockSummary>> {
    let (file, descriptor) = region.open()?;
    anyhow::ensure!(
        descriptor.compression.is_framed(),
        "Block listing requires a compressed stream"
    );

    let mut stream = BlockCompressedStream::new(file, &descriptor)?;
    let start = stream.stream_start();
    let mut blocks = Vec::new();
    loop {
        let offset = stream.buffer().position() - start;
        let loaded = stream
            .next_block()
            .with_context(|| format!("Failed to read block at offset {offset}"))?;
        if !loaded {
            break;
        }
        let header = stream
            .current_block_header()
            .with_context(|| format!("No block header at offset {offset}"))?;
        let decoded_len = stream.decoded_remaining();
        log::trace!("block at {offset}: {header:?}, decoded {decoded_len}");
        blocks.push(BlockSummary {
            offset,
            stored: header.stored,
            payload_len: header.length,
            decoded_len,
        });
    }
    Ok(blocks)
}
