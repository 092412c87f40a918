//! Error types for catalog persistence and migration.

use crate::server::{
    domain::{ServerDomainError, ServerId},
    ports::KeyValueStoreError,
};
use std::sync::Arc;
use thiserror::Error;

/// Result type for catalog persistence operations.
pub type CatalogStorageResult<T> = Result<T, CatalogStorageError>;

/// Errors raised while reading, upgrading, or writing the catalog.
///
/// A corrupt stored record is always surfaced; nothing is silently dropped.
#[derive(Debug, Clone, Error)]
pub enum CatalogStorageError {
    /// The stored value could not be decoded as the expected schema.
    #[error("stored catalog under '{key}' is corrupt: {source}")]
    Corrupt {
        /// Storage key holding the corrupt value.
        key: String,
        /// Decoding failure.
        source: Arc<serde_json::Error>,
    },

    /// A decoded record failed domain validation.
    #[error("stored catalog under '{key}' has an invalid entry '{entry}': {source}")]
    InvalidRecord {
        /// Storage key holding the record.
        key: String,
        /// Identifier or legacy key of the offending record.
        entry: String,
        /// Validation failure.
        source: ServerDomainError,
    },

    /// Two current-schema records share an identifier.
    #[error("stored catalog contains duplicate server identifier: {0}")]
    DuplicateId(ServerId),

    /// The catalog could not be serialized.
    #[error("failed to encode catalog: {0}")]
    Encode(Arc<serde_json::Error>),

    /// The underlying store failed.
    #[error(transparent)]
    Store(#[from] KeyValueStoreError),
}

impl CatalogStorageError {
    /// Creates a [`CatalogStorageError::Corrupt`] error.
    #[must_use]
    pub fn corrupt(key: impl Into<String>, err: serde_json::Error) -> Self {
        Self::Corrupt {
            key: key.into(),
            source: Arc::new(err),
        }
    }

    /// Creates a [`CatalogStorageError::InvalidRecord`] error.
    #[must_use]
    pub fn invalid_record(
        key: impl Into<String>,
        entry: impl Into<String>,
        source: ServerDomainError,
    ) -> Self {
        Self::InvalidRecord {
            key: key.into(),
            entry: entry.into(),
            source,
        }
    }
}
