//! Loading persisted catalogs, including migration from the legacy schema.

use super::helpers::{KEY_SERVER_0, load_repo, stored_catalog};
use proxy_catalog::server::{
    adapters::memory::InMemoryStorage,
    ports::KeyValueStore,
    services::ServerRepositoryError,
    versioning::{
        CatalogStorageError, SERVERS_STORAGE_KEY_V0, SERVERS_STORAGE_KEY_V1, ServerRecordV1,
        ServersStorageV0, ServersStorageV0Config, legacy_config_to_access_key,
    },
};
use rstest::{fixture, rstest};
use std::sync::Arc;

fn legacy_config(host: &str, port: u16, name: &str) -> ServersStorageV0Config {
    ServersStorageV0Config {
        host: Some(host.to_owned()),
        port: Some(port),
        password: Some("test".to_owned()),
        method: Some("chacha20-ietf-poly1305".to_owned()),
        name: Some(name.to_owned()),
    }
}

#[fixture]
fn config_0() -> ServersStorageV0Config {
    legacy_config("127.0.0.1", 1080, "fake server 0")
}

#[fixture]
fn config_1() -> ServersStorageV0Config {
    legacy_config("10.0.0.1", 1089, "fake server 1")
}

fn encode_v0(entries: &[(&str, &ServersStorageV0Config)]) -> String {
    let legacy: ServersStorageV0 = entries
        .iter()
        .map(|(key, config)| ((*key).to_owned(), (*config).clone()))
        .collect();
    serde_json::to_string(&legacy).expect("legacy catalog should encode")
}

fn record(id: &str, name: &str, config: &ServersStorageV0Config) -> ServerRecordV1 {
    ServerRecordV1 {
        id: id.to_owned(),
        name: name.to_owned(),
        access_key: legacy_config_to_access_key(config).expect("legacy config should convert"),
    }
}

#[rstest]
fn loads_v0_servers(config_0: ServersStorageV0Config, config_1: ServersStorageV0Config) {
    let store = Arc::new(InMemoryStorage::with_items([(
        SERVERS_STORAGE_KEY_V0,
        encode_v0(&[("server-0", &config_0), ("server-1", &config_1)]),
    )]));

    let context = load_repo(store).expect("legacy catalog should load");

    let server0 = context
        .repository
        .get_by_id("server-0")
        .expect("server-0 should exist");
    let server1 = context
        .repository
        .get_by_id("server-1")
        .expect("server-1 should exist");
    assert_eq!(server0.name(), "fake server 0");
    assert_eq!(server0.access_key(), KEY_SERVER_0);
    assert_eq!(server1.name(), "fake server 1");
}

#[rstest]
fn loads_v1_servers_in_preference_to_v0(
    config_0: ServersStorageV0Config,
    config_1: ServersStorageV0Config,
) {
    let current = vec![
        record("server-0", "fake server 0", &config_0),
        record("server-1", "renamed server", &config_1),
    ];
    let store = Arc::new(InMemoryStorage::with_items([
        (
            SERVERS_STORAGE_KEY_V0,
            encode_v0(&[("v0-server-0", &config_0), ("v0-server-1", &config_1)]),
        ),
        (
            SERVERS_STORAGE_KEY_V1,
            serde_json::to_string(&current).expect("current catalog should encode"),
        ),
    ]));

    let context = load_repo(store).expect("current catalog should load");

    let names: Vec<_> = context
        .repository
        .get_all()
        .iter()
        .map(|server| (server.id().as_str().to_owned(), server.name().to_owned()))
        .collect();
    assert_eq!(
        names,
        vec![
            ("server-0".to_owned(), "fake server 0".to_owned()),
            ("server-1".to_owned(), "renamed server".to_owned()),
        ]
    );
    assert!(context.repository.get_by_id("v0-server-0").is_none());
}

#[rstest]
fn stores_v1_servers(config_0: ServersStorageV0Config, config_1: ServersStorageV0Config) {
    let store = Arc::new(InMemoryStorage::with_items([(
        SERVERS_STORAGE_KEY_V0,
        encode_v0(&[("server-0", &config_0), ("server-1", &config_1)]),
    )]));
    let context = load_repo(Arc::clone(&store)).expect("legacy catalog should load");

    context
        .repository
        .forget("server-1")
        .expect("forget should succeed");
    context
        .repository
        .undo_forget("server-1")
        .expect("undo should succeed");

    let stored = stored_catalog(&store);
    assert!(stored.contains(&record("server-0", "fake server 0", &config_0)));
    assert!(stored.contains(&record("server-1", "fake server 1", &config_1)));
}

#[rstest]
fn migrated_catalog_is_read_back_as_v1(config_0: ServersStorageV0Config) {
    let legacy = encode_v0(&[("server-0", &config_0)]);
    let store = Arc::new(InMemoryStorage::with_items([(
        SERVERS_STORAGE_KEY_V0,
        legacy.clone(),
    )]));

    let first = load_repo(Arc::clone(&store)).expect("legacy catalog should load");
    first
        .repository
        .rename("server-0", "renamed after migration")
        .expect("rename should succeed");
    let second = load_repo(Arc::clone(&store)).expect("migrated catalog should load");

    assert_eq!(
        second
            .repository
            .get_by_id("server-0")
            .map(|server| server.name().to_owned()),
        Some("renamed after migration".to_owned())
    );
    assert_eq!(
        store
            .get_item(SERVERS_STORAGE_KEY_V0)
            .expect("store read should succeed"),
        Some(legacy)
    );
}

#[rstest]
fn corrupt_catalog_fails_load() {
    let store = Arc::new(InMemoryStorage::with_items([(
        SERVERS_STORAGE_KEY_V1,
        "[{\"id\": 1}]",
    )]));

    let result = load_repo(store);

    assert!(matches!(
        result,
        Err(ServerRepositoryError::Storage(
            CatalogStorageError::Corrupt { .. }
        ))
    ));
}
