//! REST KV store protocol tests

use super::mock_server::MockServerFixture;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use talent_query::cache::{CacheBackend, CacheError, RestKvCache};
use talent_query::{CacheKey, CacheManager};

fn key() -> CacheKey {
    CacheKey::from_raw("AI job attributes:abc")
}

#[tokio::test]
async fn test_get_missing_key() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_kv_command(json!(["GET", "AI job attributes:abc"]), 200, r#"{"result":null}"#)
        .await;

    let store = RestKvCache::new(&fixture.kv_config()).unwrap();
    assert_eq!(store.get(&key()).await.unwrap(), None);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_get_stored_value() {
    let mut fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_kv_command(
            json!(["GET", "AI job attributes:abc"]),
            200,
            r#"{"result":"{\"newJob\":{\"similarRoles\":[]}}"}"#,
        )
        .await;

    let store = RestKvCache::new(&fixture.kv_config()).unwrap();
    assert_eq!(
        store.get(&key()).await.unwrap().as_deref(),
        Some(r#"{"newJob":{"similarRoles":[]}}"#)
    );
}

#[tokio::test]
async fn test_set_sends_millisecond_expiry() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_kv_command(
            json!(["SET", "AI job attributes:abc", "{}", "PX", 1_800_000]),
            200,
            r#"{"result":"OK"}"#,
        )
        .await;

    let store = RestKvCache::new(&fixture.kv_config()).unwrap();
    store
        .set(&key(), "{}", Duration::from_secs(1800))
        .await
        .unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_zero_ttl_set_is_skipped() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", "/")
        .with_status(200)
        .with_body(r#"{"result":"OK"}"#)
        .expect(0)
        .create_async()
        .await;

    let store = RestKvCache::new(&fixture.kv_config()).unwrap();
    store.set(&key(), "{}", Duration::ZERO).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_delete_reports_removal() {
    let mut fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_kv_command(json!(["DEL", "AI job attributes:abc"]), 200, r#"{"result":1}"#)
        .await;

    let store = RestKvCache::new(&fixture.kv_config()).unwrap();
    assert!(store.delete(&key()).await.unwrap());
}

#[tokio::test]
async fn test_error_reply_is_backend_error() {
    let mut fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_json_response("/", 401, r#"{"error":"WRONGPASS invalid token"}"#)
        .await;

    let store = RestKvCache::new(&fixture.kv_config()).unwrap();
    match store.get(&key()).await {
        Err(CacheError::Backend(msg)) => assert!(msg.contains("WRONGPASS")),
        other => panic!("expected backend error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_non_json_reply_is_error() {
    let mut fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_json_response("/", 502, "<html>bad gateway</html>")
        .await;

    let store = RestKvCache::new(&fixture.kv_config()).unwrap();
    assert!(store.get(&key()).await.is_err());
}

#[tokio::test]
async fn test_manager_absorbs_store_outage() {
    let mut fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_json_response("/", 500, r#"{"error":"ERR internal"}"#)
        .await;

    let cache = CacheManager::new(Arc::new(RestKvCache::new(&fixture.kv_config()).unwrap()));
    assert_eq!(cache.get::<serde_json::Value>(&key()).await, None);
    cache
        .set(&key(), &json!({"a": 1}), Duration::from_secs(60))
        .await;
    cache.delete(&key()).await;

    let stats = cache.stats();
    assert_eq!(stats.errors, 3);
    assert_eq!(stats.sets, 0);
}
