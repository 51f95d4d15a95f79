use thiserror::Error;

/// Failure while reading or writing a sprite.
///
/// Reads stop at the first error, a partially decoded document is never returned.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed content: magic mismatch, unknown enum code, invalid text.
    #[error("invalid sprite data: {0}")]
    Format(String),
    /// A field or declared size reaches past the end of the buffer.
    #[error("unexpected end of data: needed {needed} bytes, {remaining} remaining")]
    Bounds { needed: usize, remaining: usize },
    /// A chunk type outside the dispatch table, under `UnknownChunkPolicy::Reject`.
    #[error("unsupported chunk type {chunk_type:#06x}")]
    UnsupportedChunk { chunk_type: u16 },
    /// A value is too large for the size field that stores it.
    #[error("{field} does not fit in its size field")]
    Overflow { field: &'static str },
    #[error("deflate stream error: {0}")]
    Compression(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn format(message: impl Into<String>) -> Self {
        Self::Format(message.into())
    }
}

impl From<parsing::Error> for Error {
    fn from(err: parsing::Error) -> Self {
        match err {
            parsing::Error::SliceTooSmall { needed, remaining } => {
                Self::Bounds { needed, remaining }
            }
            parsing::Error::PatchOutOfBounds { offset, len, size } => Self::Bounds {
                needed: offset.saturating_add(len),
                remaining: size,
            },
            parsing::Error::ValueOverflow { name } => Self::Overflow { field: name },
            err @ (parsing::Error::MagicCheckFailed { .. }
            | parsing::Error::InterpretStrFailed(_)
            | parsing::Error::EnumTypeValueMatchFailed { .. }) => Self::Format(err.to_string()),
        }
    }
}
