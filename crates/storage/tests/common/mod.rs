pub mod fixtures;

#[allow(unused_imports)]
pub use fixtures::{multipart_etag, seeded_bytes};
