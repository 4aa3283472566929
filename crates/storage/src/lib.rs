//! Remote ETag lookup for s3etag.
//!
//! This crate provides:
//! - The `EtagStore` trait: fetch an object's ETag without its content
//! - Backends: S3-compatible (AWS SDK) and in-memory

pub mod backends;
pub mod error;
pub mod traits;

pub use backends::{memory::MemoryBackend, s3::S3Backend};
pub use error::{StorageError, StorageResult};
pub use traits::{EtagStore, ObjectMeta};

use s3etag_core::RemoteConfig;
use std::sync::Arc;

/// Create an ETag store from configuration.
pub fn from_config(config: &RemoteConfig) -> StorageResult<Arc<dyn EtagStore>> {
    config.validate().map_err(StorageError::Config)?;
    let backend = S3Backend::new(config)?;
    tracing::debug!(
        bucket = %backend.bucket(),
        endpoint = %backend.endpoint(),
        region = %backend.region(),
        "created S3 backend"
    );
    Ok(Arc::new(backend))
}
