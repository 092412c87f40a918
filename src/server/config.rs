//! Catalog configuration supplied by the host application.

use crate::server::{
    domain::{ServerNaming, ServiceConfig},
    versioning::StorageKeys,
};

/// Settings for a [`crate::server::services::ServerRepository`].
///
/// # Examples
///
/// ```
/// use proxy_catalog::server::config::CatalogConfig;
///
/// let config = CatalogConfig::new()
///     .with_default_name(|service| format!("{}:{}", service.host(), service.port()));
/// assert_eq!(config.storage_keys().current, "servers_v1");
/// ```
#[derive(Debug, Clone, Default)]
pub struct CatalogConfig {
    storage_keys: StorageKeys,
    naming: ServerNaming,
}

impl CatalogConfig {
    /// Creates a configuration with the default storage keys and no host
    /// naming callback.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the storage keys.
    #[must_use]
    pub fn with_storage_keys(mut self, storage_keys: StorageKeys) -> Self {
        self.storage_keys = storage_keys;
        self
    }

    /// Sets the callback naming servers whose access key carries no name.
    #[must_use]
    pub fn with_default_name(
        mut self,
        callback: impl Fn(&ServiceConfig) -> String + Send + Sync + 'static,
    ) -> Self {
        self.naming = ServerNaming::with_default_name(callback);
        self
    }

    /// Returns the storage keys.
    #[must_use]
    pub const fn storage_keys(&self) -> &StorageKeys {
        &self.storage_keys
    }

    /// Returns the naming policy.
    #[must_use]
    pub const fn naming(&self) -> &ServerNaming {
        &self.naming
    }
}
