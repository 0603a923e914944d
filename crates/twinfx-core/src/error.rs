//! Error types for twinfx-core operations.
//!
//! # Overview
//!
//! The [`Error`] enum covers the failure modes of the core data model:
//! - Buffer construction (dimensions, byte counts)
//! - Region planning (non-positive thread counts)
//! - Codec collaborators (decode/encode failures, unknown containers)
//!
//! # Usage
//!
//! ```rust
//! use twinfx_core::{ColorSpace, Error, PixelBuffer};
//!
//! let err = PixelBuffer::from_raw(4, 4, ColorSpace::Rgb, vec![0u8; 10]).unwrap_err();
//! assert!(matches!(err, Error::BufferSize { expected: 48, got: 10 }));
//! ```
//!
//! # Dependencies
//!
//! - [`thiserror`] - For derive macro error implementation
//!
//! # Used By
//!
//! - [`crate::buffer`] - Buffer validation
//! - [`crate::region`] - Planner argument validation
//! - `twinfx-io` - Codec failures surface as [`Error::Decode`] / [`Error::Encode`]

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the core data model.
#[derive(Debug, Error)]
pub enum Error {
    /// A caller-supplied argument is out of its valid domain.
    ///
    /// Returned for zero thread counts and missing/empty source buffers.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Image dimensions are zero or overflow the address space.
    #[error("invalid dimensions: {width}x{height} ({reason})")]
    InvalidDimensions {
        /// Requested width
        width: usize,
        /// Requested height
        height: usize,
        /// Reason why dimensions are invalid
        reason: String,
    },

    /// Raw byte storage does not match `width * height * channels`.
    #[error("buffer size mismatch: expected {expected} bytes, got {got}")]
    BufferSize {
        /// Expected byte count
        expected: usize,
        /// Actual byte count
        got: usize,
    },

    /// The codec collaborator could not decode the container bytes.
    #[error("decode error: {0}")]
    Decode(String),

    /// The codec collaborator could not encode the pixel buffer.
    #[error("encode error: {0}")]
    Encode(String),

    /// Container format or color space name is not recognized.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
}

impl Error {
    /// Creates an [`Error::InvalidArgument`] error.
    #[inline]
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Creates an [`Error::InvalidDimensions`] error.
    #[inline]
    pub fn invalid_dimensions(width: usize, height: usize, reason: impl Into<String>) -> Self {
        Self::InvalidDimensions {
            width,
            height,
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::Decode`] error.
    #[inline]
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Creates an [`Error::Encode`] error.
    #[inline]
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Creates an [`Error::UnsupportedFormat`] error.
    #[inline]
    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat(format.into())
    }

    /// Returns `true` if this error came from a codec collaborator.
    #[inline]
    pub fn is_codec_error(&self) -> bool {
        matches!(self, Self::Decode(_) | Self::Encode(_) | Self::UnsupportedFormat(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_dimensions_message() {
        let err = Error::invalid_dimensions(0, 10, "zero width");
        let msg = err.to_string();
        assert!(msg.contains("0x10"));
        assert!(msg.contains("zero width"));
        assert!(!err.is_codec_error());
    }

    #[test]
    fn test_codec_errors() {
        assert!(Error::decode("truncated").is_codec_error());
        assert!(Error::encode("no encoder").is_codec_error());
        assert!(Error::unsupported_format("gif").to_string().contains("gif"));
    }
}
