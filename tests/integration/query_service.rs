//! Query service wired from configuration against mock KV and model servers

use super::mock_server::{chat_completion, MockServerFixture};
use serde_json::json;
use std::sync::Arc;
use talent_query::cache::derive_key;
use talent_query::config::QueryConfig;
use talent_query::{AppConfig, Caller, ErrorCode, InMemoryLedger, NaturalLanguageQueryService};

const ANSWER: &str = r#"{"newJob":{"role":"Rust Engineer","similarRoles":["Systems Engineer"]}}"#;

fn app_config(fixture: &MockServerFixture) -> AppConfig {
    AppConfig {
        kv_store: Some(fixture.kv_config()),
        generator: fixture.generator_config(),
        query: QueryConfig {
            hit_delay_ms: 0,
            ..QueryConfig::default()
        },
    }
}

fn query_key() -> String {
    derive_key("AI job attributes", "rust engineer")
}

#[tokio::test]
async fn test_miss_debits_calls_model_and_stores_answer() {
    let mut fixture = MockServerFixture::new().await;
    let get = fixture
        .mock_kv_command(json!(["GET", query_key()]), 200, r#"{"result":null}"#)
        .await;
    let set = fixture
        .mock_kv_command(
            json!(["SET", query_key(), ANSWER, "PX", 1_800_000]),
            200,
            r#"{"result":"OK"}"#,
        )
        .await;
    let model = fixture
        .mock_json_response("/chat/completions", 200, &chat_completion(ANSWER))
        .await;

    let ledger = InMemoryLedger::new().with_user("u1", 2);
    let svc = NaturalLanguageQueryService::from_app_config(
        &app_config(&fixture),
        Arc::new(ledger.clone()),
    )
    .unwrap();

    let attrs = svc
        .natural_language_query(&Caller::new("u1"), "  Rust Engineer ")
        .await
        .unwrap();

    assert_eq!(
        attrs.new_job.and_then(|job| job.role).as_deref(),
        Some("Rust Engineer")
    );
    assert_eq!(ledger.get("u1"), Some(1));
    get.assert_async().await;
    model.assert_async().await;
    set.assert_async().await;
}

#[tokio::test]
async fn test_hit_skips_model_and_ledger() {
    let mut fixture = MockServerFixture::new().await;
    let _get = fixture
        .mock_kv_command(
            json!(["GET", query_key()]),
            200,
            &json!({ "result": ANSWER }).to_string(),
        )
        .await;
    let model = fixture
        .server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(chat_completion(ANSWER))
        .expect(0)
        .create_async()
        .await;

    let ledger = InMemoryLedger::new().with_user("u1", 0);
    let svc = NaturalLanguageQueryService::from_app_config(
        &app_config(&fixture),
        Arc::new(ledger.clone()),
    )
    .unwrap();

    let attrs = svc
        .natural_language_query(&Caller::new("u1"), "RUST ENGINEER")
        .await
        .unwrap();

    assert!(attrs.new_job.is_some());
    assert_eq!(ledger.get("u1"), Some(0));
    assert_eq!(svc.cache_stats().hits, 1);
    model.assert_async().await;
}

#[tokio::test]
async fn test_provider_outage_is_refunded_and_not_cached() {
    let mut fixture = MockServerFixture::new().await;
    let _get = fixture
        .mock_kv_command(json!(["GET", query_key()]), 200, r#"{"result":null}"#)
        .await;
    let _model = fixture
        .mock_json_response(
            "/chat/completions",
            500,
            r#"{"error":{"message":"internal error"}}"#,
        )
        .await;

    let ledger = InMemoryLedger::new().with_user("u1", 1);
    let svc = NaturalLanguageQueryService::from_app_config(
        &app_config(&fixture),
        Arc::new(ledger.clone()),
    )
    .unwrap();

    let err = svc
        .natural_language_query(&Caller::new("u1"), "rust engineer")
        .await
        .unwrap_err();

    assert_eq!(err.code(), ErrorCode::InternalServerError);
    assert_eq!(ledger.get("u1"), Some(1));
    assert_eq!(svc.cache_stats().sets, 0);
}
