//! On-disk catalog shapes and storage keys.

use crate::server::domain::{ServerDomainError, ServiceConfig, to_access_key};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Storage key of the legacy (V0) catalog.
pub const SERVERS_STORAGE_KEY_V0: &str = "servers";

/// Storage key of the current (V1) catalog.
pub const SERVERS_STORAGE_KEY_V1: &str = "servers_v1";

/// Legacy connection record, stored without an explicit identifier.
///
/// Every field is optional on disk; missing required fields are reported
/// when the record is migrated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServersStorageV0Config {
    /// Server host.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Server port.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Server password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Cipher method.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Legacy catalog: arbitrary key to connection record.
///
/// Keys are iterated in sorted order during migration.
pub type ServersStorageV0 = BTreeMap<String, ServersStorageV0Config>;

/// Current catalog record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerRecordV1 {
    /// Server identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Canonical access key.
    pub access_key: String,
}

/// Current catalog: ordered server records.
pub type ServersStorageV1 = Vec<ServerRecordV1>;

/// Whatever was found in the store, tagged by schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredCatalog {
    /// Neither schema is present.
    Absent,
    /// Only the legacy schema is present.
    Legacy(ServersStorageV0),
    /// The current schema is present. Any legacy record is ignored.
    Current(ServersStorageV1),
}

/// Storage keys used for each schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    /// Key of the legacy (V0) catalog.
    pub legacy: String,
    /// Key of the current (V1) catalog.
    pub current: String,
}

impl StorageKeys {
    /// Creates a custom key pair.
    #[must_use]
    pub fn new(legacy: impl Into<String>, current: impl Into<String>) -> Self {
        Self {
            legacy: legacy.into(),
            current: current.into(),
        }
    }
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self::new(SERVERS_STORAGE_KEY_V0, SERVERS_STORAGE_KEY_V1)
    }
}

impl ServersStorageV0Config {
    /// Builds the validated connection definition for this record. The
    /// legacy name becomes the tag.
    ///
    /// # Errors
    ///
    /// Returns [`ServerDomainError::InvalidServiceConfiguration`] when a
    /// required field is missing or invalid.
    pub fn to_service_config(&self) -> Result<ServiceConfig, ServerDomainError> {
        let port = self
            .port
            .ok_or_else(|| ServerDomainError::invalid_configuration("port is missing"))?;
        let config = ServiceConfig::new(
            self.host.clone().unwrap_or_default(),
            port,
            self.method.clone().unwrap_or_default(),
            self.password.clone().unwrap_or_default(),
        )?;
        Ok(match self.name.as_deref() {
            Some(name) => config.with_tag(name),
            None => config,
        })
    }
}

/// Converts a legacy record into its canonical access key.
///
/// # Examples
///
/// ```
/// use proxy_catalog::server::versioning::{ServersStorageV0Config, legacy_config_to_access_key};
///
/// let legacy = ServersStorageV0Config {
///     host: Some("127.0.0.1".to_owned()),
///     port: Some(1080),
///     password: Some("test".to_owned()),
///     method: Some("chacha20-ietf-poly1305".to_owned()),
///     name: Some("fake server 0".to_owned()),
/// };
/// let access_key = legacy_config_to_access_key(&legacy).expect("valid legacy record");
/// assert_eq!(
///     access_key,
///     "ss://Y2hhY2hhMjAtaWV0Zi1wb2x5MTMwNTp0ZXN0@127.0.0.1:1080/#fake%20server%200",
/// );
/// ```
///
/// # Errors
///
/// Returns [`ServerDomainError::InvalidServiceConfiguration`] when a
/// required field is missing or invalid.
pub fn legacy_config_to_access_key(
    config: &ServersStorageV0Config,
) -> Result<String, ServerDomainError> {
    config.to_service_config().map(|service| to_access_key(&service))
}
