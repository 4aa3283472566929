//! Comparison engine for s3etag.
//!
//! Walks a local file or directory, looks up each file's counterpart in an
//! [`EtagStore`](s3etag_storage::EtagStore), infers the chunking policy from
//! the remote ETag and reports one [`Comparison`] per file as a lazy stream.

pub mod compare;
pub mod error;
pub mod walk;

pub use compare::{
    CompareRequest, Comparison, ComparisonStream, compare, compare_file, hash_file, remote_key,
};
pub use error::{VerifyError, VerifyResult};
pub use walk::{FileStream, LocalFile, walk_files};
