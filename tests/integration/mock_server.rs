//! Mock HTTP server setup for integration tests

use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::Value;
use talent_query::config::{GeneratorConfig, KvStoreConfig};

pub const KV_TOKEN: &str = "kv-test-token";
pub const AI_KEY: &str = "sk-test";

/// Test fixture that owns a mock server standing in for the KV store and
/// the model provider.
pub struct MockServerFixture {
    pub server: ServerGuard,
    pub base_url: String,
}

impl MockServerFixture {
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        let base_url = server.url();
        Self { server, base_url }
    }

    pub fn kv_config(&self) -> KvStoreConfig {
        KvStoreConfig::new(self.base_url.clone(), KV_TOKEN)
    }

    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            base_url: self.base_url.clone(),
            api_key: Some(AI_KEY.to_string()),
            timeout_secs: 5,
            ..GeneratorConfig::default()
        }
    }

    /// Mock for one KV command, matched on its exact JSON body.
    pub async fn mock_kv_command(&mut self, command: Value, status: usize, reply: &str) -> Mock {
        self.server
            .mock("POST", "/")
            .match_header("authorization", format!("Bearer {}", KV_TOKEN).as_str())
            .match_body(Matcher::Json(command))
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(reply)
            .create_async()
            .await
    }

    /// Mock for any request to `path`.
    pub async fn mock_json_response(&mut self, path: &str, status: usize, body: &str) -> Mock {
        self.server
            .mock("POST", path)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }
}

/// A chat completion whose message content is `content`.
pub fn chat_completion(content: &str) -> String {
    serde_json::json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 120, "completion_tokens": 30, "total_tokens": 150}
    })
    .to_string()
}
