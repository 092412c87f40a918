//! Identifier type for catalog servers.

use super::ServerDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a server in the catalog.
///
/// Identifiers are opaque strings. Fresh identifiers are random UUIDs, while
/// identifiers carried over from legacy catalogs keep their stored key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServerId(String);

impl ServerId {
    /// Creates a server identifier from an existing value.
    ///
    /// # Errors
    ///
    /// Returns [`ServerDomainError::EmptyServerId`] when the value is empty
    /// or whitespace-only.
    pub fn new(value: impl Into<String>) -> Result<Self, ServerDomainError> {
        let id = value.into();
        if id.trim().is_empty() {
            return Err(ServerDomainError::EmptyServerId);
        }
        Ok(Self(id))
    }

    /// Generates a new random server identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ServerId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ServerId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}
