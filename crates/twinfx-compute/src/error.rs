//! Error types for the compute layer.

use thiserror::Error;
use twinfx_ops::OpsError;

/// Error type for pool, job and session operations.
#[derive(Error, Debug)]
pub enum ComputeError {
    /// A caller-supplied argument failed validation.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The filter name is not in the catalog.
    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    /// The worker pool has begun shutting down.
    #[error("worker pool is stopped")]
    PoolStopped,

    /// The OS refused to start a worker thread.
    #[error("failed to spawn worker: {0}")]
    WorkerSpawn(String),

    /// No session with this id is open.
    #[error("unknown session: {0}")]
    UnknownSession(u64),

    /// The codec could not decode or encode an image.
    #[error("codec error: {0}")]
    Codec(twinfx_core::Error),

    /// Core type error (planning, buffer geometry).
    #[error(transparent)]
    Core(#[from] twinfx_core::Error),

    /// Filter error.
    #[error(transparent)]
    Ops(OpsError),
}

impl From<OpsError> for ComputeError {
    fn from(err: OpsError) -> Self {
        match err {
            OpsError::UnknownFilter(name) => Self::InvalidFilter(name),
            other => Self::Ops(other),
        }
    }
}

impl ComputeError {
    /// Creates an invalid argument error.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

/// Result type for compute operations.
pub type ComputeResult<T> = Result<T, ComputeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_filter_maps_to_invalid_filter() {
        let err: ComputeError = OpsError::UnknownFilter("bogus".into()).into();
        assert!(matches!(err, ComputeError::InvalidFilter(ref n) if n == "bogus"));
        assert_eq!(err.to_string(), "invalid filter: bogus");
    }

    #[test]
    fn test_core_error_is_transparent() {
        let err: ComputeError = twinfx_core::Error::invalid_argument("n == 0").into();
        assert!(err.to_string().contains("n == 0"));
    }
}
