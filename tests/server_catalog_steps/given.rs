//! Given steps for server catalog BDD scenarios.

use super::world::{CatalogWorld, run_async};
use eyre::WrapErr;
use proxy_catalog::server::{
    events::ServerEventKind,
    ports::KeyValueStore,
    versioning::{SERVERS_STORAGE_KEY_V0, ServersStorageV0, ServersStorageV0Config},
};
use rstest_bdd_macros::given;
use std::sync::Arc;

#[given("an empty server catalog")]
fn an_empty_server_catalog(world: &mut CatalogWorld) -> Result<(), eyre::Report> {
    world.load()
}

#[given(r#"a server added from "{access_key}""#)]
fn a_server_added_from(world: &mut CatalogWorld, access_key: String) -> Result<(), eyre::Report> {
    let server = run_async(world.repository()?.add(&access_key))
        .wrap_err("add server for scenario")?;
    world.last_added = Some(server);
    Ok(())
}

#[given("a subscriber recording catalog events")]
fn a_subscriber_recording_events(world: &mut CatalogWorld) {
    for kind in [
        ServerEventKind::Added,
        ServerEventKind::Renamed,
        ServerEventKind::Forgotten,
        ServerEventKind::ForgetUndone,
    ] {
        let sink = Arc::clone(&world.delivered);
        world.events.subscribe(kind, move |event| {
            if let Ok(mut delivered) = sink.lock() {
                delivered.push(event.kind().to_string());
            }
        });
    }
}

#[given(r#"a legacy catalog with server "{key}" named "{name}""#)]
fn a_legacy_catalog(world: &mut CatalogWorld, key: String, name: String) -> Result<(), eyre::Report> {
    let legacy: ServersStorageV0 = [(
        key,
        ServersStorageV0Config {
            host: Some("127.0.0.1".to_owned()),
            port: Some(1080),
            password: Some("test".to_owned()),
            method: Some("chacha20-ietf-poly1305".to_owned()),
            name: Some(name),
        },
    )]
    .into_iter()
    .collect();
    let encoded = serde_json::to_string(&legacy).wrap_err("encode legacy catalog")?;
    world
        .store
        .set_item(SERVERS_STORAGE_KEY_V0, &encoded)
        .wrap_err("seed legacy catalog")?;
    Ok(())
}
