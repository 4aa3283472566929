//! Storage error types.

use thiserror::Error;

/// Remote lookup errors.
///
/// A missing object is not an error; lookups report it as `None`.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("S3 error: {0}")]
    S3(#[from] Box<dyn std::error::Error + Send + Sync>),

    #[error("malformed etag for {key}: {source}")]
    InvalidEtag {
        key: String,
        #[source]
        source: s3etag_core::Error,
    },

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;
