use std::{fmt, str::FromStr};

use orcstream_common::{Result, error::Error};

/// Compression applied to the streams of an ORC file, as recorded in the file
/// postscript. The numeric identifiers match the `CompressionKind` protobuf enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompressionKind {
    /// Streams are stored as-is, without block framing.
    #[default]
    None,
    /// Raw deflate blocks (no zlib or gzip wrapper).
    Zlib,
    /// Snappy raw block format.
    Snappy,
    Lzo,
    /// LZ4 raw block format, without a size prefix.
    Lz4,
    /// Zstandard frames.
    Zstd,
}

impl CompressionKind {
    pub const ALL: [CompressionKind; 6] = [
        CompressionKind::None,
        CompressionKind::Zlib,
        CompressionKind::Snappy,
        CompressionKind::Lzo,
        CompressionKind::Lz4,
        CompressionKind::Zstd,
    ];

    pub fn from_id(id: u32) -> Result<CompressionKind> {
        CompressionKind::ALL
            .get(id as usize)
            .copied()
            .ok_or_else(|| {
                log::error!("Compression kind is unsupported. ID: {id}");
                Error::unsupported_codec(format!("id {id}"))
            })
    }

    pub fn id(&self) -> u32 {
        match self {
            CompressionKind::None => 0,
            CompressionKind::Zlib => 1,
            CompressionKind::Snappy => 2,
            CompressionKind::Lzo => 3,
            CompressionKind::Lz4 => 4,
            CompressionKind::Zstd => 5,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CompressionKind::None => "none",
            CompressionKind::Zlib => "zlib",
            CompressionKind::Snappy => "snappy",
            CompressionKind::Lzo => "lzo",
            CompressionKind::Lz4 => "lz4",
            CompressionKind::Zstd => "zstd",
        }
    }

    /// Returns `true` if streams of this kind are split into framed blocks.
    pub fn is_framed(&self) -> bool {
        *self != CompressionKind::None
    }
}

impl fmt::Display for CompressionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CompressionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.to_ascii_lowercase();
        CompressionKind::ALL
            .iter()
            .find(|kind| kind.name() == name)
            .copied()
            .ok_or_else(|| Error::unsupported_codec(s))
    }
}

#[cfg(test)]
mod tests {
    use super::CompressionKind;

    #[test]
    fn test_ids_match_protobuf_enum() {
        for (id, kind) in CompressionKind::ALL.iter().enumerate() {
            assert_eq!(kind.id(), id as u32);
            assert_eq!(CompressionKind::from_id(id as u32).unwrap(), *kind);
        }
        assert!(CompressionKind::from_id(6).is_err());
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("ZLIB".parse::<CompressionKind>().unwrap(), CompressionKind::Zlib);
        assert_eq!("snappy".parse::<CompressionKind>().unwrap(), CompressionKind::Snappy);
        assert_eq!(CompressionKind::Zstd.to_string(), "zstd");
        assert!("brotli".parse::<CompressionKind>().is_err());
        assert!(!CompressionKind::None.is_framed());
        assert!(CompressionKind::Lz4.is_framed());
    }
}
