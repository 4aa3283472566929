//! Deterministic local directory walk.

use crate::error::{VerifyError, VerifyResult};
use futures::Stream;
use std::fs::FileType;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use tokio::fs;

/// A boxed stream of files found under a root directory.
pub type FileStream = Pin<Box<dyn Stream<Item = VerifyResult<LocalFile>> + Send>>;

/// A regular file found by the walk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalFile {
    /// Full path to the file (under the walk root).
    pub path: PathBuf,
    /// Path relative to the walk root.
    pub relative: PathBuf,
}

impl LocalFile {
    /// The relative path with `/` separators on every platform.
    pub fn name(&self) -> String {
        relative_name(&self.relative)
    }
}

/// Join the components of a relative path with `/`.
pub fn relative_name(relative: &Path) -> String {
    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> VerifyError + '_ {
    move |source| VerifyError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Read a directory's entries sorted by name in descending order, so that
/// popping from the end visits them in ascending order.
async fn read_dir_sorted(dir: &Path) -> VerifyResult<Vec<(PathBuf, FileType)>> {
    let mut entries = fs::read_dir(dir).await.map_err(io_error(dir))?;
    let mut children = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(io_error(dir))? {
        let path = entry.path();
        let file_type = entry.file_type().await.map_err(io_error(&path))?;
        children.push((path, file_type));
    }
    children.sort_by(|(a, _), (b, _)| b.file_name().cmp(&a.file_name()));
    Ok(children)
}

/// Resolve a symlink to whether it should be treated as a regular file.
async fn symlink_is_file(path: &Path) -> VerifyResult<bool> {
    match fs::metadata(path).await {
        Ok(meta) if meta.is_file() => Ok(true),
        Ok(meta) if meta.is_dir() => {
            tracing::debug!(path = %path.display(), "not following symlinked directory");
            Ok(false)
        }
        Ok(_) => Ok(false),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "skipping dangling symlink");
            Ok(false)
        }
        Err(e) => Err(io_error(path)(e)),
    }
}

/// Walk `root` depth-first, yielding every regular file in relative-path order.
///
/// Each directory's entries are visited sorted by name. Symlinks are skipped
/// when `ignore_symlinks` is set; otherwise links to regular files are
/// yielded, links to directories are not descended and dangling links are
/// skipped. The walk stops at the first I/O error.
pub fn walk_files(root: impl Into<PathBuf>, ignore_symlinks: bool) -> FileStream {
    let root = root.into();

    let stream = async_stream::try_stream! {
        let mut pending = read_dir_sorted(&root).await?;
        while let Some((path, file_type)) = pending.pop() {
            if file_type.is_dir() {
                let mut children = read_dir_sorted(&path).await?;
                pending.append(&mut children);
                continue;
            }

            let is_file = if file_type.is_symlink() {
                if ignore_symlinks {
                    tracing::trace!(path = %path.display(), "ignoring symlink");
                    false
                } else {
                    symlink_is_file(&path).await?
                }
            } else {
                file_type.is_file()
            };

            if is_file {
                let relative = path.strip_prefix(&root).unwrap_or(&path).to_path_buf();
                yield LocalFile { path, relative };
            } else if !file_type.is_symlink() {
                tracing::debug!(path = %path.display(), "skipping special file");
            }
        }
    };

    Box::pin(stream)
}
