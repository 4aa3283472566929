//! In-process ETag store.

use crate::error::{StorageError, StorageResult};
use crate::traits::{EtagStore, ObjectMeta};
use async_trait::async_trait;
use s3etag_core::{ChunkingPolicy, DEFAULT_CHUNK_SIZE, Etag, MultipartThreshold, compute_etag};
use std::collections::HashMap;
use std::sync::RwLock;

/// ETag store backed by a map, for tests and offline comparisons.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    objects: RwLock<HashMap<String, ObjectMeta>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an object with a known ETag.
    pub fn insert(&self, key: impl Into<String>, etag: Etag, size: Option<u64>) {
        let mut objects = self.objects.write().unwrap_or_else(|e| e.into_inner());
        objects.insert(key.into(), ObjectMeta { etag, size });
    }

    /// Record an object as if `data` had been uploaded.
    ///
    /// With `part_size` set the upload is multipart with that part size,
    /// even for empty `data`; otherwise it is a single PUT.
    pub fn insert_content(
        &self,
        key: impl Into<String>,
        data: &[u8],
        part_size: Option<u64>,
    ) -> StorageResult<Etag> {
        let key = key.into();
        let threshold = match part_size {
            Some(_) => MultipartThreshold::Always,
            None => MultipartThreshold::Never,
        };
        let policy = ChunkingPolicy::new(part_size.unwrap_or(DEFAULT_CHUNK_SIZE), threshold)
            .map_err(|e| StorageError::Config(e.to_string()))?;

        let etag = compute_etag(data, data.len() as u64, &policy).map_err(|source| {
            StorageError::InvalidEtag {
                key: key.clone(),
                source,
            }
        })?;
        self.insert(key, etag, Some(data.len() as u64));
        Ok(etag)
    }

    /// Remove an object, returning whether it existed.
    pub fn remove(&self, key: &str) -> bool {
        let mut objects = self.objects.write().unwrap_or_else(|e| e.into_inner());
        objects.remove(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.objects.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl EtagStore for MemoryBackend {
    async fn head(&self, key: &str) -> StorageResult<Option<ObjectMeta>> {
        if key.is_empty() {
            return Err(StorageError::InvalidKey("object key must not be empty".to_string()));
        }
        let objects = self.objects.read().unwrap_or_else(|e| e.into_inner());
        Ok(objects.get(key).cloned())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
