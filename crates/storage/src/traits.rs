//! Storage trait definitions.

use crate::error::StorageResult;
use async_trait::async_trait;
use s3etag_core::Etag;

/// Object metadata returned by a head lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectMeta {
    /// The object's ETag, quotes stripped.
    pub etag: Etag,
    /// Object size in bytes, when the backend reports it.
    pub size: Option<u64>,
}

/// Read-only view of an object store's ETags.
#[async_trait]
pub trait EtagStore: Send + Sync + 'static {
    /// Fetch an object's metadata without its content.
    ///
    /// Returns `Ok(None)` when the object does not exist.
    async fn head(&self, key: &str) -> StorageResult<Option<ObjectMeta>>;

    /// Fetch an object's ETag.
    ///
    /// Returns `Ok(None)` when the object does not exist.
    async fn etag(&self, key: &str) -> StorageResult<Option<Etag>> {
        Ok(self.head(key).await?.map(|meta| meta.etag))
    }

    /// Get the backend name for logging.
    fn backend_name(&self) -> &'static str;
}
