//! Error types for filter operations.

use thiserror::Error;

/// Error type for filter operations.
#[derive(Error, Debug)]
pub enum OpsError {
    /// Filter name is not in the catalog.
    #[error("unknown filter: {0}")]
    UnknownFilter(String),

    /// Region does not fit inside the source image.
    #[error("region out of bounds: {0}")]
    RegionOutOfBounds(String),

    /// Source and destination have different geometry or color space.
    #[error("size mismatch: {0}")]
    SizeMismatch(String),

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type for filter operations.
pub type OpsResult<T> = Result<T, OpsError>;
