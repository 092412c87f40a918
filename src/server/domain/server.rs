//! Server definition aggregate.

use super::{ServerDomainError, ServerId, ServiceConfig, parse_access_key, to_access_key};

/// A durable catalog entry: identifier, display name, and access key.
///
/// The stored access key is always the canonical serialization of the
/// parsed connection definition, so the two never disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Server {
    id: ServerId,
    name: String,
    access_key: String,
    config: ServiceConfig,
}

impl Server {
    /// Creates a server from a validated connection definition.
    #[must_use]
    pub fn new(id: ServerId, name: impl Into<String>, config: ServiceConfig) -> Self {
        Self {
            id,
            name: name.into(),
            access_key: to_access_key(&config),
            config,
        }
    }

    /// Reconstructs a server from a persisted access key.
    ///
    /// # Errors
    ///
    /// Returns [`ServerDomainError::InvalidServiceConfiguration`] when the
    /// access key does not parse.
    pub fn from_access_key(
        id: ServerId,
        name: impl Into<String>,
        access_key: &str,
    ) -> Result<Self, ServerDomainError> {
        let config = parse_access_key(access_key)?;
        Ok(Self::new(id, name, config))
    }

    /// Returns the server identifier.
    #[must_use]
    pub const fn id(&self) -> &ServerId {
        &self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the canonical access key.
    #[must_use]
    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    /// Returns the parsed connection definition.
    #[must_use]
    pub const fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Replaces the display name. The access key is left untouched.
    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }
}
