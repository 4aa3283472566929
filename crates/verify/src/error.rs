//! Comparison error types.

use s3etag_storage::StorageError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that end a comparison run.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to hash {path}: {source}")]
    Hash {
        path: PathBuf,
        #[source]
        source: s3etag_core::Error,
    },

    #[error("remote lookup failed for {key}: {source}")]
    Storage {
        key: String,
        #[source]
        source: StorageError,
    },

    #[error("invalid comparison request: {0}")]
    InvalidRequest(String),

    #[error("hashing task failed: {0}")]
    Task(String),
}

/// Result type for comparison operations.
pub type VerifyResult<T> = std::result::Result<T, VerifyError>;
