use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

pub type StdErrorBoxed = Box<dyn std::error::Error + Send + Sync + 'static>;

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    pub fn invalid_format(element: impl Into<String>, message: impl Into<String>) -> Error {
        ErrorKind::InvalidFormat {
            element: element.into(),
            message: message.into(),
        }
        .into()
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        ErrorKind::InvalidArgument {
            name: name.into(),
            message: message.into(),
        }
        .into()
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Error {
        ErrorKind::Io {
            context: context.into(),
            source,
        }
        .into()
    }

    pub fn short_read(
        context: impl Into<String>,
        offset: u64,
        expected: usize,
        actual: usize,
    ) -> Error {
        ErrorKind::ShortRead {
            context: context.into(),
            offset,
            expected,
            actual,
        }
        .into()
    }

    pub fn codec(codec: impl Into<String>, message: impl Into<String>) -> Error {
        ErrorKind::Codec {
            codec: codec.into(),
            message: message.into(),
            source: None,
        }
        .into()
    }

    pub fn codec_with_source<E>(
        codec: impl Into<String>,
        message: impl Into<String>,
        source: E,
    ) -> Error
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ErrorKind::Codec {
            codec: codec.into(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
        .into()
    }

    pub fn unsupported_codec(name: impl Into<String>) -> Error {
        ErrorKind::UnsupportedCodec { name: name.into() }.into()
    }

    pub fn block_too_large(required: usize, capacity: usize) -> Error {
        ErrorKind::BlockTooLarge { required, capacity }.into()
    }

    pub fn seek_out_of_range(offset: u64, available: u64) -> Error {
        ErrorKind::SeekOutOfRange { offset, available }.into()
    }

    pub fn read_spans_blocks(requested: usize, available: usize) -> Error {
        ErrorKind::ReadSpansBlocks {
            requested,
            available,
        }
        .into()
    }

    pub fn positions_exhausted(expected: &'static str) -> Error {
        ErrorKind::PositionsExhausted { expected }.into()
    }

    /// Returns `true` for failures caused by the underlying storage rather than
    /// by the content read from it.
    pub fn is_io(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Io { .. } | ErrorKind::ShortRead { .. }
        )
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("IO error for '{context}': {source}")]
    Io {
        context: String,
        source: std::io::Error,
    },

    #[error(
        "short read for '{context}' at offset {offset}: expected {expected} bytes, got {actual}"
    )]
    ShortRead {
        context: String,
        offset: u64,
        expected: usize,
        actual: usize,
    },

    #[error("invalid storage format for '{element}': {message}")]
    InvalidFormat { element: String, message: String },

    #[error("{codec} decompression failed: {message}")]
    Codec {
        codec: String,
        message: String,
        #[source]
        source: Option<StdErrorBoxed>,
    },

    #[error("compression codec is not supported: {name}")]
    UnsupportedCodec { name: String },

    #[error("block buffer too small: size = {capacity}, needed = {required}")]
    BlockTooLarge { required: usize, capacity: usize },

    #[error("seek offset {offset} is out of range, {available} bytes available")]
    SeekOutOfRange { offset: u64, available: u64 },

    #[error(
        "requested {requested} bytes exceed the {available} bytes available \
         across two consecutive blocks"
    )]
    ReadSpansBlocks { requested: usize, available: usize },

    #[error("not enough positions to seek, missing {expected}")]
    PositionsExhausted { expected: &'static str },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::io("", e)
    }
}
