//! Repository operation tests: add, rename, forget, undo, and lookups.

use super::helpers::{
    KEY_SERVER_0, KEY_SERVER_1, KEY_UNNAMED, TestContext, context, stored_catalog,
};
use proxy_catalog::server::{
    domain::{parse_access_key, to_access_key},
    services::ServerRepositoryError,
};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn add_stores_servers(context: TestContext) {
    let server0 = context
        .repository
        .add(KEY_SERVER_0)
        .await
        .expect("first add should succeed");
    let server1 = context
        .repository
        .add(KEY_SERVER_1)
        .await
        .expect("second add should succeed");

    let stored = stored_catalog(&context.store);
    let stored_ids: Vec<_> = stored.iter().map(|record| record.id.as_str()).collect();
    assert_eq!(
        stored_ids,
        vec![server0.id().as_str(), server1.id().as_str()]
    );
    assert_eq!(stored[0].access_key, KEY_SERVER_0);
    assert_eq!(stored[1].name, "fake server 1");
    assert_eq!(
        context.vpn.validated_hosts().expect("fake VPN state"),
        vec!["127.0.0.1", "10.0.0.1"]
    );
}

#[rstest]
#[case::empty("")]
#[case::malformed("ss://invalid")]
#[case::wrong_scheme("https://example.com")]
#[tokio::test(flavor = "multi_thread")]
async fn add_rejects_invalid_access_keys(context: TestContext, #[case] access_key: &str) {
    let result = context.repository.add(access_key).await;

    let err = result.expect_err("invalid key should be rejected");
    assert!(err.is_invalid_service_configuration(), "got {err:?}");
    assert!(context.repository.get_all().is_empty());
    assert!(stored_catalog(&context.store).is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn add_surfaces_vpn_rejection(context: TestContext) {
    context
        .vpn
        .reject_host("10.0.0.1", "unreachable")
        .expect("fake VPN state");

    let result = context.repository.add(KEY_SERVER_1).await;

    assert!(matches!(result, Err(ServerRepositoryError::Vpn(_))));
    assert!(context.repository.get_all().is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn add_canonicalizes_access_key(context: TestContext) {
    let padded = "ss://YWVzLTEyOC1nY206dGVzdA==@127.0.0.1:8000/?plugin=obfs-local#Padded";

    let server = context
        .repository
        .add(padded)
        .await
        .expect("add should succeed");

    let canonical = to_access_key(&parse_access_key(padded).expect("key should parse"));
    assert_eq!(server.access_key(), canonical);
    assert_eq!(
        server.access_key(),
        "ss://YWVzLTEyOC1nY206dGVzdA@127.0.0.1:8000/?plugin=obfs-local#Padded"
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn add_uses_default_name_callback(context: TestContext) {
    let server = context
        .repository
        .add(KEY_UNNAMED)
        .await
        .expect("add should succeed");

    assert_eq!(server.name(), "192.168.1.20:8388");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn get_all_returns_added_servers(context: TestContext) {
    let server0 = context
        .repository
        .add(KEY_SERVER_0)
        .await
        .expect("first add should succeed");
    let server1 = context
        .repository
        .add(KEY_SERVER_1)
        .await
        .expect("second add should succeed");

    assert_eq!(context.repository.get_all(), vec![server0, server1]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn get_by_id_retrieves_added_servers(context: TestContext) {
    let server = context
        .repository
        .add(KEY_SERVER_0)
        .await
        .expect("add should succeed");

    let found = context
        .repository
        .get_by_id(server.id().as_str())
        .expect("server should be found");

    assert_eq!(found.id(), server.id());
    assert_eq!(found.access_key(), KEY_SERVER_0);
}

#[rstest]
fn get_by_id_returns_none_for_nonexistent_servers(context: TestContext) {
    assert!(context.repository.get_by_id("not-a-server").is_none());
    assert!(context.repository.get_by_id("").is_none());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn renames_servers(context: TestContext) {
    let server = context
        .repository
        .add(KEY_SERVER_0)
        .await
        .expect("add should succeed");

    context
        .repository
        .rename(server.id().as_str(), "new name")
        .expect("rename should succeed");

    let renamed = context
        .repository
        .get_by_id(server.id().as_str())
        .expect("server should be found");
    assert_eq!(renamed.name(), "new name");
    assert_eq!(stored_catalog(&context.store)[0].name, "new name");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn forgets_servers(context: TestContext) {
    let server = context
        .repository
        .add(KEY_SERVER_0)
        .await
        .expect("add should succeed");

    context
        .repository
        .forget(server.id().as_str())
        .expect("forget should succeed");

    assert!(context.repository.get_by_id(server.id().as_str()).is_none());
    assert!(context.repository.get_all().is_empty());
    assert!(stored_catalog(&context.store).is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn undoes_forgetting_servers(context: TestContext) {
    let server = context
        .repository
        .add(KEY_SERVER_0)
        .await
        .expect("add should succeed");
    let id = server.id().as_str();

    context.repository.forget(id).expect("forget should succeed");
    context
        .repository
        .undo_forget(id)
        .expect("undo should succeed");

    let restored = context
        .repository
        .get_by_id(id)
        .expect("server should be restored");
    assert_eq!(restored.id(), server.id());
    assert_eq!(restored.name(), server.name());
    assert_eq!(context.repository.get_all().len(), 1);
    assert_eq!(stored_catalog(&context.store).len(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn readding_forgotten_server_is_allowed(context: TestContext) {
    let server = context
        .repository
        .add(KEY_SERVER_0)
        .await
        .expect("add should succeed");
    context
        .repository
        .forget(server.id().as_str())
        .expect("forget should succeed");

    let readded = context
        .repository
        .add(KEY_SERVER_0)
        .await
        .expect("re-adding a forgotten server should succeed");

    assert_ne!(readded.id(), server.id());
    assert_eq!(context.repository.get_all().len(), 1);
}
