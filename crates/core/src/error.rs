//! Error types for the core domain.

use thiserror::Error;

/// Core domain error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid etag: {0}")]
    InvalidEtag(String),

    #[error("invalid chunk size: {0} (must be greater than zero)")]
    InvalidChunkSize(u64),

    #[error("invalid size: {0}")]
    InvalidSize(String),

    #[error("invalid multipart threshold: {0}")]
    InvalidThreshold(String),

    #[error("too many parts for an ETag: {0}")]
    TooManyParts(u64),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
