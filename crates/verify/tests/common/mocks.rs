use async_trait::async_trait;
use s3etag_storage::{EtagStore, MemoryBackend, ObjectMeta, StorageError, StorageResult};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;

/// Wraps a memory backend and records every key looked up, in order.
#[allow(dead_code)]
pub struct InstrumentedStore {
    pub inner: MemoryBackend,
    lookups: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl InstrumentedStore {
    pub fn new(inner: MemoryBackend) -> Arc<Self> {
        Arc::new(Self {
            inner,
            lookups: Mutex::new(Vec::new()),
        })
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl EtagStore for InstrumentedStore {
    async fn head(&self, key: &str) -> StorageResult<Option<ObjectMeta>> {
        self.lookups.lock().unwrap().push(key.to_string());
        self.inner.head(key).await
    }

    fn backend_name(&self) -> &'static str {
        "instrumented"
    }
}

/// Serves from a memory backend but fails lookups for one key.
#[allow(dead_code)]
pub struct FailingStore {
    pub inner: MemoryBackend,
    pub fail_key: String,
}

#[allow(dead_code)]
impl FailingStore {
    pub fn new(inner: MemoryBackend, fail_key: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            fail_key: fail_key.into(),
        })
    }
}

#[async_trait]
impl EtagStore for FailingStore {
    async fn head(&self, key: &str) -> StorageResult<Option<ObjectMeta>> {
        if key == self.fail_key {
            return Err(StorageError::S3(Box::new(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "simulated transport failure",
            ))));
        }
        self.inner.head(key).await
    }

    fn backend_name(&self) -> &'static str {
        "failing"
    }
}

/// Deletes a local file when a given key is looked up, so the file vanishes
/// between the lookup and hashing.
#[allow(dead_code)]
pub struct DeletingStore {
    pub inner: MemoryBackend,
    pub trigger_key: String,
    pub doomed: PathBuf,
}

#[allow(dead_code)]
impl DeletingStore {
    pub fn new(
        inner: MemoryBackend,
        trigger_key: impl Into<String>,
        doomed: impl Into<PathBuf>,
    ) -> Arc<Self> {
        Arc::new(Self {
            inner,
            trigger_key: trigger_key.into(),
            doomed: doomed.into(),
        })
    }
}

#[async_trait]
impl EtagStore for DeletingStore {
    async fn head(&self, key: &str) -> StorageResult<Option<ObjectMeta>> {
        if key == self.trigger_key {
            std::fs::remove_file(&self.doomed).unwrap();
        }
        self.inner.head(key).await
    }

    fn backend_name(&self) -> &'static str {
        "deleting"
    }
}
