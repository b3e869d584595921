//! OpenAI-compatible generator against a mock provider

use super::mock_server::{chat_completion, MockServerFixture, AI_KEY};
use mockito::Matcher;
use serde_json::json;
use talent_query::attributes::JobAttributes;
use talent_query::structured::json_schema_from_type;
use talent_query::{Error, ErrorCode, OpenAiGenerator, StructuredGenerator};

#[tokio::test]
async fn test_generate_returns_message_json() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", "/chat/completions")
        .match_header("authorization", format!("Bearer {}", AI_KEY).as_str())
        .match_body(Matcher::PartialJson(json!({
            "model": "gpt-4o-mini",
            "response_format": {"type": "json_schema"}
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(chat_completion(
            r#"{"newJob":{"role":"Rust Engineer","similarRoles":["Systems Engineer"]}}"#,
        ))
        .create_async()
        .await;

    let generator = OpenAiGenerator::new(&fixture.generator_config()).unwrap();
    let schema = json_schema_from_type::<JobAttributes>();
    let value = generator
        .generate("extract filters", &schema, "rust engineer")
        .await
        .unwrap();

    assert_eq!(value["newJob"]["role"], "Rust Engineer");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_fenced_content_is_extracted() {
    let mut fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_json_response(
            "/chat/completions",
            200,
            &chat_completion("```json\n{\"education\":{\"degree\":\"PhD\"}}\n```"),
        )
        .await;

    let generator = OpenAiGenerator::new(&fixture.generator_config()).unwrap();
    let value = generator
        .generate("extract filters", &json!({"type": "object"}), "phd holders")
        .await
        .unwrap();

    assert_eq!(value["education"]["degree"], "PhD");
}

#[tokio::test]
async fn test_upstream_error_keeps_status_and_message() {
    let mut fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_json_response(
            "/chat/completions",
            429,
            r#"{"error":{"message":"Rate limit reached","type":"requests"}}"#,
        )
        .await;

    let generator = OpenAiGenerator::new(&fixture.generator_config()).unwrap();
    let err = generator
        .generate("extract filters", &json!({"type": "object"}), "anyone")
        .await
        .unwrap_err();

    match &err {
        Error::Upstream { status, message } => {
            assert_eq!(*status, 429);
            assert_eq!(message, "Rate limit reached");
        }
        other => panic!("expected upstream error, got {:?}", other),
    }
    assert_eq!(err.code(), ErrorCode::InternalServerError);
}

#[tokio::test]
async fn test_non_json_content_is_error() {
    let mut fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_json_response(
            "/chat/completions",
            200,
            &chat_completion("Sorry, I can't help with that."),
        )
        .await;

    let generator = OpenAiGenerator::new(&fixture.generator_config()).unwrap();
    let err = generator
        .generate("extract filters", &json!({"type": "object"}), "anyone")
        .await
        .unwrap_err();

    assert_eq!(err.code(), ErrorCode::InternalServerError);
}
