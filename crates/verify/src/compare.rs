//! Local-versus-remote ETag comparison.

use crate::error::{VerifyError, VerifyResult};
use crate::walk::walk_files;
use futures::{Stream, StreamExt};
use s3etag_core::{ChunkingPolicy, DEFAULT_CHUNK_SIZE, Etag, compute_file_etag, infer_policy};
use s3etag_storage::EtagStore;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use tokio::fs;

/// A boxed stream of comparison results, one per local file.
pub type ComparisonStream = Pin<Box<dyn Stream<Item = VerifyResult<Comparison>> + Send>>;

/// What to compare: a local file or directory against a remote key or prefix.
#[derive(Clone, Debug)]
pub struct CompareRequest {
    /// Local file or directory.
    pub path: PathBuf,
    /// Object key for a file, or key prefix for a directory.
    pub key: String,
    /// Part size assumed for multipart remotes.
    pub chunk_size: u64,
    /// Skip symlinks found while walking a directory.
    pub ignore_symlinks: bool,
}

impl CompareRequest {
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            ignore_symlinks: false,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: u64) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_ignore_symlinks(mut self, ignore_symlinks: bool) -> Self {
        self.ignore_symlinks = ignore_symlinks;
        self
    }

    fn validate(&self) -> VerifyResult<()> {
        if self.chunk_size == 0 {
            return Err(VerifyError::InvalidRequest(
                "chunk size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// The outcome of comparing one local file with its remote object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Comparison {
    /// File identifier: the path relative to the compared directory, or the
    /// path as given when a single file was compared.
    pub name: String,
    /// Local path that was hashed.
    pub path: PathBuf,
    /// Remote object key that was looked up.
    pub key: String,
    /// ETag computed from the local file.
    pub local: Etag,
    /// ETag reported by the store, absent if the object does not exist.
    pub remote: Option<Etag>,
}

impl Comparison {
    /// True if the remote object exists and its ETag matches the local one.
    pub fn is_equal(&self) -> bool {
        self.remote.as_ref() == Some(&self.local)
    }
}

/// Build the remote key for a file found under a compared directory.
///
/// The relative path is joined onto `prefix` with `/`. A trailing `/` on the
/// prefix is not doubled and an empty prefix yields the bare relative path.
pub fn remote_key(prefix: &str, relative: &Path) -> String {
    let name = crate::walk::relative_name(relative);
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        name
    } else {
        format!("{prefix}/{name}")
    }
}

fn ensure_regular_file(path: &Path, metadata: &std::fs::Metadata) -> VerifyResult<()> {
    if metadata.is_file() {
        Ok(())
    } else {
        Err(VerifyError::InvalidRequest(format!(
            "{} is neither a regular file nor a directory",
            path.display()
        )))
    }
}

/// Hash a local file on the blocking pool.
pub async fn hash_file(path: PathBuf, policy: ChunkingPolicy) -> VerifyResult<Etag> {
    let task_path = path.clone();
    tokio::task::spawn_blocking(move || compute_file_etag(&task_path, &policy))
        .await
        .map_err(|e| VerifyError::Task(e.to_string()))?
        .map_err(|source| VerifyError::Hash { path, source })
}

/// Compare one local file with the object at `key`.
///
/// The remote ETag is fetched first; its shape decides whether the local
/// file is hashed as a single part or in `chunk_size` parts.
pub async fn compare_file(
    store: &dyn EtagStore,
    key: &str,
    path: PathBuf,
    name: String,
    chunk_size: u64,
) -> VerifyResult<Comparison> {
    let remote = store
        .etag(key)
        .await
        .map_err(|source| VerifyError::Storage {
            key: key.to_string(),
            source,
        })?;

    let policy = infer_policy(remote.as_ref(), chunk_size).map_err(|source| VerifyError::Hash {
        path: path.clone(),
        source,
    })?;
    let local = hash_file(path.clone(), policy).await?;

    if let (Some(remote_parts), Some(local_parts)) = (
        remote.as_ref().and_then(Etag::part_count),
        local.part_count(),
    ) && remote_parts != local_parts
    {
        tracing::warn!(
            key = %key,
            remote_parts,
            local_parts,
            chunk_size = %s3etag_core::format_size(chunk_size),
            "part count differs from remote; the object was likely uploaded with a different chunk size"
        );
    }

    let comparison = Comparison {
        name,
        path,
        key: key.to_string(),
        local,
        remote,
    };
    tracing::debug!(
        key = %comparison.key,
        local = %comparison.local,
        remote = ?comparison.remote.map(|etag| etag.to_string()),
        equal = comparison.is_equal(),
        "compared"
    );
    Ok(comparison)
}

/// Compare a local file or directory tree with the remote store.
///
/// Results are produced lazily in relative-path order, one per regular
/// file. The first local I/O or remote lookup error is yielded as the last
/// item; no further files are visited after it.
pub fn compare(store: Arc<dyn EtagStore>, request: CompareRequest) -> ComparisonStream {
    let stream = async_stream::try_stream! {
        request.validate()?;

        let metadata = fs::metadata(&request.path)
            .await
            .map_err(|source| VerifyError::Io {
                path: request.path.clone(),
                source,
            })?;

        if metadata.is_dir() {
            tracing::debug!(
                root = %request.path.display(),
                prefix = %request.key,
                backend = store.backend_name(),
                "comparing directory"
            );
            let mut files = walk_files(request.path.clone(), request.ignore_symlinks);
            while let Some(file) = files.next().await {
                let file = file?;
                let key = remote_key(&request.key, &file.relative);
                let name = file.name();
                yield compare_file(store.as_ref(), &key, file.path, name, request.chunk_size).await?;
            }
        } else {
            ensure_regular_file(&request.path, &metadata)?;
            let name = request.path.display().to_string();
            yield compare_file(
                store.as_ref(),
                &request.key,
                request.path.clone(),
                name,
                request.chunk_size,
            )
            .await?;
        }
    };

    Box::pin(stream)
}
