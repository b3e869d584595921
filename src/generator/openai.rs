use super::{ChatMessage, StructuredGenerator};
use crate::config::GeneratorConfig;
use crate::structured::{extract_json, schema_name, JsonModeConfig};
use crate::{Error, ErrorContext, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

/// Structured generation over an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiGenerator {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    temperature: f64,
}

impl OpenAiGenerator {
    pub fn new(config: &GeneratorConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            temperature: config.temperature,
        })
    }

    pub fn build_request_body(&self, messages: &[ChatMessage], schema: &Value) -> Value {
        let mut body = json!({
            "model": self.model,
            "messages": messages,
            "temperature": self.temperature,
        });
        body["response_format"] =
            JsonModeConfig::from_schema(schema.clone(), schema_name(schema, "response"))
                .to_openai_response_format();
        body
    }

    fn parse_response(body: &Value) -> Result<Value> {
        let context = || ErrorContext::new().with_source("generator");

        if let Some(refusal) = body
            .pointer("/choices/0/message/refusal")
            .and_then(|v| v.as_str())
        {
            return Err(Error::internal_with_context(
                "model refused the request",
                context().with_details(refusal),
            ));
        }

        let content = body
            .pointer("/choices/0/message/content")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                Error::internal_with_context(
                    "response has no message content",
                    context().with_field_path("choices[0].message.content"),
                )
            })?;

        extract_json(content).ok_or_else(|| {
            Error::internal_with_context(
                "message content is not JSON",
                context().with_details(content.chars().take(200).collect::<String>()),
            )
        })
    }
}

#[async_trait]
impl StructuredGenerator for OpenAiGenerator {
    async fn generate(
        &self,
        system_prompt: &str,
        schema: &Value,
        user_message: &str,
    ) -> Result<Value> {
        let messages = [ChatMessage::system(system_prompt), ChatMessage::user(user_message)];
        let body = self.build_request_body(&messages, schema);
        let url = format!("{}/chat/completions", self.base_url);

        let mut request = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|v| {
                    v.pointer("/error/message")
                        .and_then(|m| m.as_str())
                        .map(String::from)
                })
                .unwrap_or_else(|| text.chars().take(200).collect());
            return Err(Error::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let payload: Value = serde_json::from_str(&text)?;

        debug!(
            model = %self.model,
            total_tokens = payload.pointer("/usage/total_tokens").and_then(|t| t.as_u64()),
            "model call completed"
        );
        Self::parse_response(&payload)
    }

    fn name(&self) -> &str {
        &self.model
    }
}
