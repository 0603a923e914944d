//! Error types for I/O operations.

use std::io;
use thiserror::Error;

/// I/O operation error.
#[derive(Debug, Error)]
pub enum IoError {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Unsupported format.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Decoding error.
    #[error("decode error: {0}")]
    DecodeError(String),

    /// Encoding error.
    #[error("encode error: {0}")]
    EncodeError(String),

    /// Pixel buffer error.
    #[error(transparent)]
    Core(#[from] twinfx_core::Error),
}

/// Result type for I/O operations.
pub type IoResult<T> = Result<T, IoError>;

impl From<IoError> for twinfx_core::Error {
    fn from(err: IoError) -> Self {
        match err {
            IoError::Core(e) => e,
            IoError::DecodeError(msg) => Self::decode(msg),
            IoError::EncodeError(msg) => Self::encode(msg),
            IoError::UnsupportedFormat(f) => Self::unsupported_format(f),
            IoError::Io(e) => Self::decode(e.to_string()),
        }
    }
}
