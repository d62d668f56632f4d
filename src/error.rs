use alloc::string::String;
use enough::StopReason;

/// Errors from opening or rendering a BMP, GIF or PNM image.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DecodeError {
    #[cfg(feature = "std")]
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid format: {0}")]
    InvalidFormat(String),

    #[error("dimensions too large: {width}x{height}")]
    DimensionsTooLarge { width: u32, height: u32 },

    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("truncated data: {0}")]
    Truncated(String),

    #[error("value out of range: {0}")]
    OutOfRange(String),

    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("buffer too small: need {needed} bytes, got {actual}")]
    BufferTooSmall { needed: usize, actual: usize },

    #[error("viewport width {width} exceeds sink stride {stride}")]
    InvalidViewport { width: u32, stride: u32 },

    #[error("operation cancelled")]
    Cancelled(StopReason),
}

/// Coarse classification of a [`DecodeError`].
///
/// Lets callers tell "this file is invalid" apart from "this file is valid
/// but uses a feature this crate does not decode".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The file could not be read.
    Io,
    /// Bad magic, version, header discriminant, geometry or field combination.
    Format,
    /// Declared sizes exceed the data, or a stream ended early.
    Truncated,
    /// A palette index or LZW code outside its table.
    DecodeRange,
    /// Recognized but out-of-scope feature (compressed BMP, interlaced GIF).
    Unsupported,
    /// A configured [`crate::Limits`] bound was hit.
    Limit,
    /// The sink or viewport handed to `render` is unusable.
    Caller,
    /// The [`enough::Stop`] token fired.
    Cancelled,
}

impl DecodeError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            #[cfg(feature = "std")]
            DecodeError::Io(_) => ErrorKind::Io,
            DecodeError::InvalidFormat(_) | DecodeError::DimensionsTooLarge { .. } => {
                ErrorKind::Format
            }
            DecodeError::UnexpectedEof | DecodeError::Truncated(_) => ErrorKind::Truncated,
            DecodeError::OutOfRange(_) => ErrorKind::DecodeRange,
            DecodeError::Unsupported(_) => ErrorKind::Unsupported,
            DecodeError::LimitExceeded(_) => ErrorKind::Limit,
            DecodeError::BufferTooSmall { .. } | DecodeError::InvalidViewport { .. } => {
                ErrorKind::Caller
            }
            DecodeError::Cancelled(_) => ErrorKind::Cancelled,
        }
    }
}

impl From<StopReason> for DecodeError {
    fn from(r: StopReason) -> Self {
        DecodeError::Cancelled(r)
    }
}
