//! Core domain types and digest logic for s3etag.
//!
//! This crate defines the pieces every other crate builds on:
//! - The `Etag` digest in its simple and multipart shapes
//! - MD5 hashing, including the multipart part-hash-of-hashes scheme
//! - Chunking policies and their inference from a remote digest
//! - Human-readable byte sizes
//! - Remote store configuration

pub mod config;
pub mod error;
pub mod etag;
pub mod hash;
pub mod policy;
pub mod size;

pub use config::RemoteConfig;
pub use error::{Error, Result};
pub use etag::Etag;
pub use hash::{EtagHasher, Md5Hash, compute_etag, compute_file_etag};
pub use policy::{ChunkingPolicy, MultipartThreshold, infer_policy};
pub use size::{format_size, parse_size};

/// Default multipart chunk size: 8 MiB
pub const DEFAULT_CHUNK_SIZE: u64 = 8 * 1024 * 1024;

/// Default size above which uploads become multipart: 8 MiB
pub const DEFAULT_MULTIPART_THRESHOLD: u64 = 8 * 1024 * 1024;
