//! In-memory adapters for tests and ephemeral catalogs.

mod storage;

pub use storage::InMemoryStorage;
