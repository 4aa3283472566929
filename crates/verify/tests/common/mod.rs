pub mod fixtures;
pub mod mocks;

#[allow(unused_imports)]
pub use fixtures::{seeded_bytes, write_file};
#[allow(unused_imports)]
pub use mocks::{DeletingStore, FailingStore, InstrumentedStore};
