//! Service layer for catalog orchestration.

mod repository;

pub use repository::{ServerRepository, ServerRepositoryError, ServerRepositoryResult};
