//! Remote ETag backends.

pub mod memory;
pub mod s3;
