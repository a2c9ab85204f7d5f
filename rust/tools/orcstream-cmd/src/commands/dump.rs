//! Dump command implementation

use anyhow::Result;
use orcstream::BlockCompressedStream;

use crate::{
    commands::RegionArgs,
    utils::{format_size, hex_lines},
};

pub fn run(region: RegionArgs, limit: usize) -> Result<()> {
    let (file, descriptor) = region.open()?;
    let mut stream = BlockCompressedStream::new(file, &descriptor)?;
    let data = stream.read_remaining()?;

    println!(
        "stream: {} ({} on disk), compression: {}",
        region.file,
        format_size(descriptor.len()),
        descriptor.compression
    );
    println!("decoded: {}", format_size(data.len() as u64));

    let preview = &data[..data.len().min(limit)];
    for line in hex_lines(preview) {
        println!("{line}");
    }
    if preview.len() < data.len() {
        println!("... {} more bytes", data.len() - preview.len());
    }

    println!(
        "blocks loaded: {}, decompressed: {}",
        stream.blocks_loaded(),
        stream.blocks_decompressed()
    );
    Ok(())
}
