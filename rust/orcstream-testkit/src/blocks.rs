//! Writer side of the block framing, for building test streams.

use std::io::Write;

use orcstream_compression::CompressionKind;

const MAX_BLOCK_LENGTH: usize = (1 << 23) - 1;

/// Encodes a 3-byte block header: `(length << 1) | stored`, little-endian.
pub fn encode_header(stored: bool, length: usize) -> anyhow::Result<[u8; 3]> {
    if length > MAX_BLOCK_LENGTH {
        anyhow::bail!("block length {length} exceeds {MAX_BLOCK_LENGTH}");
    }
    let value = (length << 1) | stored as usize;
    Ok([value as u8, (value >> 8) as u8, (value >> 16) as u8])
}

/// Compresses `data` as a single block payload of the given codec.
pub fn compress_block(kind: CompressionKind, data: &[u8]) -> anyhow::Result<Vec<u8>> {
    let compressed = match kind {
        CompressionKind::Zlib => {
            let mut encoder =
                flate2::write::DeflateEncoder::new(Vec::new(), flate2::Compression::default());
            encoder.write_all(data)?;
            encoder.finish()?
        }
        CompressionKind::Snappy => snap::raw::Encoder::new().compress_vec(data)?,
        CompressionKind::Lz4 => lz4::block::compress(data, None, false)?,
        CompressionKind::Zstd => zstd::bulk::compress(data, 3)?,
        CompressionKind::None | CompressionKind::Lzo => {
            anyhow::bail!("cannot compress blocks with {kind}")
        }
    };
    Ok(compressed)
}

/// Description of a block appended by [`BlockStreamBuilder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockInfo {
    /// Offset of the block header relative to the start of the stream.
    pub offset: u64,
    pub stored: bool,
    /// Length of the payload on disk, as written in the header.
    pub payload_len: usize,
    /// Bytes the block decodes to.
    pub decoded: Vec<u8>,
}

/// Builds the on-disk bytes of a compressed stream block by block.
///
/// ```ignore
/// let mut builder = BlockStreamBuilder::new(CompressionKind::Zlib);
/// builder.push_stored(b"0123456789")?.push_compressed(&[7u8; 500])?;
/// let bytes = builder.finish();
/// ```
#[derive(Debug, Clone)]
pub struct BlockStreamBuilder {
    kind: CompressionKind,
    bytes: Vec<u8>,
    blocks: Vec<BlockInfo>,
}

impl BlockStreamBuilder {
    pub fn new(kind: CompressionKind) -> BlockStreamBuilder {
        BlockStreamBuilder {
            kind,
            bytes: Vec::new(),
            blocks: Vec::new(),
        }
    }

    pub fn kind(&self) -> CompressionKind {
        self.kind
    }

    /// Appends a block holding `data` literally.
    pub fn push_stored(&mut self, data: &[u8]) -> anyhow::Result<&mut Self> {
        self.append(true, data, data)?;
        Ok(self)
    }

    /// Appends a block holding `data` compressed with the builder's codec, even if
    /// compression makes it larger.
    pub fn push_compressed(&mut self, data: &[u8]) -> anyhow::Result<&mut Self> {
        let payload = compress_block(self.kind, data)?;
        self.append(false, &payload, data)?;
        Ok(self)
    }

    /// Appends `data` the way an ORC writer does: compressed, unless compression
    /// does not make the block smaller.
    pub fn push(&mut self, data: &[u8]) -> anyhow::Result<&mut Self> {
        let payload = compress_block(self.kind, data)?;
        if payload.len() < data.len() {
            self.append(false, &payload, data)?;
        } else {
            self.append(true, data, data)?;
        }
        Ok(self)
    }

    /// Appends raw bytes with no header, for building malformed streams.
    pub fn push_raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    pub fn blocks(&self) -> &[BlockInfo] {
        &self.blocks
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Concatenation of the decoded content of every block.
    pub fn decoded(&self) -> Vec<u8> {
        self.blocks
            .iter()
            .flat_map(|block| block.decoded.iter().copied())
            .collect()
    }

    pub fn finish(self) -> Vec<u8> {
        self.bytes
    }

    fn append(&mut self, stored: bool, payload: &[u8], decoded: &[u8]) -> anyhow::Result<()> {
        let header = encode_header(stored, payload.len())?;
        self.blocks.push(BlockInfo {
            offset: self.bytes.len() as u64,
            stored,
            payload_len: payload.len(),
            decoded: decoded.to_vec(),
        });
        self.bytes.extend_from_slice(&header);
        self.bytes.extend_from_slice(payload);
        Ok(())
    }
}
