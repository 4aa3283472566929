//! Chunking policies and their inference from a remote ETag.

use crate::etag::Etag;
use crate::{DEFAULT_CHUNK_SIZE, DEFAULT_MULTIPART_THRESHOLD};
use std::fmt;
use std::str::FromStr;

/// Size above which content is hashed as a multipart upload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MultipartThreshold {
    /// Multipart when the length is strictly greater than this many bytes.
    Bytes(u64),
    /// Always multipart, even for empty content.
    Always,
    /// Never multipart.
    Never,
}

impl MultipartThreshold {
    /// True if content of `len` bytes crosses the threshold.
    pub fn is_exceeded_by(&self, len: u64) -> bool {
        match self {
            Self::Bytes(threshold) => len > *threshold,
            Self::Always => true,
            Self::Never => false,
        }
    }
}

impl FromStr for MultipartThreshold {
    type Err = crate::Error;

    /// Accepts a human-readable size, `inf`/`infinite`/`never` to force
    /// single-part hashing, or `always` to force multipart hashing.
    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inf" | "infinite" | "infinity" | "never" => Ok(Self::Never),
            "always" => Ok(Self::Always),
            other => crate::size::parse_size(other)
                .map(Self::Bytes)
                .map_err(|_| crate::Error::InvalidThreshold(s.to_string())),
        }
    }
}

impl fmt::Display for MultipartThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bytes(bytes) => write!(f, "{}", crate::size::format_size(*bytes)),
            Self::Always => write!(f, "always"),
            Self::Never => write!(f, "never"),
        }
    }
}

/// How local content is split to reproduce a remote ETag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkingPolicy {
    chunk_size: u64,
    threshold: MultipartThreshold,
}

impl ChunkingPolicy {
    /// Create a policy. The chunk size must be non-zero.
    pub fn new(chunk_size: u64, threshold: MultipartThreshold) -> crate::Result<Self> {
        if chunk_size == 0 {
            return Err(crate::Error::InvalidChunkSize(chunk_size));
        }
        Ok(Self {
            chunk_size,
            threshold,
        })
    }

    /// Part size used for multipart hashing.
    pub fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    /// Threshold deciding between single-part and multipart hashing.
    pub fn threshold(&self) -> MultipartThreshold {
        self.threshold
    }

    /// True if content of `len` bytes is hashed as multipart.
    pub fn is_multipart(&self, len: u64) -> bool {
        self.threshold.is_exceeded_by(len)
    }
}

impl Default for ChunkingPolicy {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            threshold: MultipartThreshold::Bytes(DEFAULT_MULTIPART_THRESHOLD),
        }
    }
}

/// Pick the local chunking policy that can reproduce `remote`.
///
/// Only the shape of the remote ETag is recoverable, not its part size, so a
/// multipart remote forces multipart hashing at the configured chunk size,
/// empty files included, and anything else (including a missing object)
/// forces a single part.
pub fn infer_policy(remote: Option<&Etag>, chunk_size: u64) -> crate::Result<ChunkingPolicy> {
    let threshold = match remote {
        Some(etag) if etag.is_multipart() => MultipartThreshold::Always,
        _ => MultipartThreshold::Never,
    };
    ChunkingPolicy::new(chunk_size, threshold)
}
