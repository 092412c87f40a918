//! Persisted catalog schemas and migrate-on-read support.
//!
//! Two schemas exist on disk. The legacy V0 catalog is a JSON object mapping
//! arbitrary keys to unversioned connection records; the current V1 catalog
//! is an ordered JSON array of `{id, name, accessKey}` records. Loading
//! upgrades whatever is stored to V1; saving only ever writes V1.

mod error;
mod migrator;
mod schema;

pub use error::{CatalogStorageError, CatalogStorageResult};
pub use migrator::{CatalogMigrator, CatalogUpgrade, upgrade_catalog};
pub use schema::{
    SERVERS_STORAGE_KEY_V0, SERVERS_STORAGE_KEY_V1, ServerRecordV1, ServersStorageV0,
    ServersStorageV0Config, ServersStorageV1, StorageKeys, StoredCatalog,
    legacy_config_to_access_key,
};
