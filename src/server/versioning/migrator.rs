//! Migrate-on-read catalog persistence.

use super::{
    CatalogStorageError, CatalogStorageResult, ServerRecordV1, ServersStorageV0,
    ServersStorageV1, StorageKeys, StoredCatalog,
};
use crate::server::{
    domain::{Server, ServerId, ServerNaming},
    ports::KeyValueStore,
};
use std::collections::HashSet;
use std::sync::Arc;

/// Result of upgrading a stored catalog to the current schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogUpgrade {
    /// Servers in catalog order.
    pub servers: Vec<Server>,
    /// Whether the servers came from the legacy schema and should be written
    /// back in the current format.
    pub migrated: bool,
}

/// Upgrades whatever is stored to the current schema.
///
/// This is a pure function: it never touches storage. Legacy keys are kept
/// as identifiers when they are non-blank; otherwise a fresh identifier is
/// generated. Legacy records without a name are named by `naming`.
///
/// # Errors
///
/// Returns [`CatalogStorageError::InvalidRecord`] when a record fails
/// validation and [`CatalogStorageError::DuplicateId`] when two current
/// records share an identifier.
pub fn upgrade_catalog(
    stored: StoredCatalog,
    keys: &StorageKeys,
    naming: &ServerNaming,
) -> CatalogStorageResult<CatalogUpgrade> {
    match stored {
        StoredCatalog::Absent => Ok(CatalogUpgrade {
            servers: Vec::new(),
            migrated: false,
        }),
        StoredCatalog::Current(records) => Ok(CatalogUpgrade {
            servers: servers_from_v1(records, &keys.current)?,
            migrated: false,
        }),
        StoredCatalog::Legacy(legacy) => Ok(CatalogUpgrade {
            servers: servers_from_v0(legacy, &keys.legacy, naming)?,
            migrated: true,
        }),
    }
}

fn servers_from_v1(records: ServersStorageV1, key: &str) -> CatalogStorageResult<Vec<Server>> {
    let mut seen = HashSet::new();
    let mut servers = Vec::with_capacity(records.len());
    for record in records {
        let id = ServerId::new(record.id.as_str())
            .map_err(|err| CatalogStorageError::invalid_record(key, &record.id, err))?;
        if !seen.insert(id.clone()) {
            return Err(CatalogStorageError::DuplicateId(id));
        }
        let server = Server::from_access_key(id, record.name, &record.access_key)
            .map_err(|err| CatalogStorageError::invalid_record(key, &record.id, err))?;
        servers.push(server);
    }
    Ok(servers)
}

fn servers_from_v0(
    legacy: ServersStorageV0,
    key: &str,
    naming: &ServerNaming,
) -> CatalogStorageResult<Vec<Server>> {
    let mut seen = HashSet::new();
    let mut servers = Vec::with_capacity(legacy.len());
    for (legacy_key, record) in legacy {
        let config = record
            .to_service_config()
            .map_err(|err| CatalogStorageError::invalid_record(key, &legacy_key, err))?;
        let id = ServerId::new(legacy_key)
            .ok()
            .filter(|id| !seen.contains(id))
            .unwrap_or_else(ServerId::generate);
        seen.insert(id.clone());
        let name = naming.name_for(record.name.as_deref(), &config);
        servers.push(Server::new(id, name, config));
    }
    Ok(servers)
}

/// Reads and writes the catalog through a [`KeyValueStore`].
///
/// Loading prefers the current record. When only the legacy record exists it
/// is upgraded and the result is written back under the current key, so a
/// later load sees only the current record once that write succeeds. The
/// legacy record is never rewritten.
#[derive(Debug)]
pub struct CatalogMigrator<S>
where
    S: KeyValueStore,
{
    store: Arc<S>,
    keys: StorageKeys,
    naming: ServerNaming,
}

impl<S> CatalogMigrator<S>
where
    S: KeyValueStore,
{
    /// Creates a migrator over `store`.
    #[must_use]
    pub const fn new(store: Arc<S>, keys: StorageKeys, naming: ServerNaming) -> Self {
        Self {
            store,
            keys,
            naming,
        }
    }

    /// Returns the storage keys in use.
    #[must_use]
    pub const fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    /// Reads the raw stored catalog, decoding whichever schema is present.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogStorageError::Corrupt`] when a present record does
    /// not decode, or store errors.
    pub fn read(&self) -> CatalogStorageResult<StoredCatalog> {
        if let Some(raw) = self.store.get_item(&self.keys.current)? {
            let records: ServersStorageV1 = serde_json::from_str(&raw)
                .map_err(|err| CatalogStorageError::corrupt(&self.keys.current, err))?;
            return Ok(StoredCatalog::Current(records));
        }

        if let Some(raw) = self.store.get_item(&self.keys.legacy)? {
            let legacy: ServersStorageV0 = serde_json::from_str(&raw)
                .map_err(|err| CatalogStorageError::corrupt(&self.keys.legacy, err))?;
            return Ok(StoredCatalog::Legacy(legacy));
        }

        Ok(StoredCatalog::Absent)
    }

    /// Loads the catalog, migrating the legacy schema when necessary.
    ///
    /// The migrated catalog is written back under the current key. A failed
    /// write-back is logged and the migrated servers are still returned; the
    /// legacy record stays the source until a write succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogStorageError`] when the stored catalog cannot be
    /// read, is corrupt, or holds invalid records.
    pub fn load(&self) -> CatalogStorageResult<Vec<Server>> {
        let upgrade = upgrade_catalog(self.read()?, &self.keys, &self.naming)?;
        if upgrade.migrated {
            match self.save(&upgrade.servers) {
                Ok(()) => tracing::info!(
                    servers = upgrade.servers.len(),
                    from = %self.keys.legacy,
                    to = %self.keys.current,
                    "migrated legacy server catalog"
                ),
                Err(err) => tracing::warn!(
                    error = %err,
                    from = %self.keys.legacy,
                    to = %self.keys.current,
                    "could not write back migrated server catalog; it will be migrated again on next load"
                ),
            }
        }
        tracing::debug!(servers = upgrade.servers.len(), "server catalog loaded");
        Ok(upgrade.servers)
    }

    /// Writes `servers` in the current schema.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogStorageError`] when encoding or the store write fails.
    pub fn save(&self, servers: &[Server]) -> CatalogStorageResult<()> {
        let records: ServersStorageV1 = servers
            .iter()
            .map(|server| ServerRecordV1 {
                id: server.id().as_str().to_owned(),
                name: server.name().to_owned(),
                access_key: server.access_key().to_owned(),
            })
            .collect();
        let encoded = serde_json::to_string(&records)
            .map_err(|err| CatalogStorageError::Encode(Arc::new(err)))?;
        self.store.set_item(&self.keys.current, &encoded)?;
        tracing::debug!(servers = records.len(), key = %self.keys.current, "server catalog saved");
        Ok(())
    }
}
