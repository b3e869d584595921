//! Redis-over-REST backend (Upstash command protocol).
//!
//! Each command is a `POST` to the store URL whose JSON body is the command
//! array, e.g. `["SET", "key", "value", "PX", 60000]`. The store replies with
//! `{"result": ...}` on success or `{"error": "..."}` on failure.

use super::backend::{CacheBackend, CacheError};
use super::key::CacheKey;
use crate::config::KvStoreConfig;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct RestReply {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

pub struct RestKvCache {
    client: reqwest::Client,
    url: String,
    token: String,
}

impl RestKvCache {
    pub fn new(config: &KvStoreConfig) -> Result<Self, CacheError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            .build()
            .map_err(|e| CacheError::Backend(format!("client build failed: {e}")))?;

        Ok(Self {
            client,
            url: config.url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    async fn command(&self, args: Value) -> Result<Value, CacheError> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.token)
            .json(&args)
            .send()
            .await
            .map_err(|e| CacheError::Backend(format!("request failed: {e}")))?;

        let status = response.status();
        let reply: RestReply = response
            .json()
            .await
            .map_err(|e| CacheError::Serialization(format!("reply (HTTP {status}): {e}")))?;

        if let Some(err) = reply.error {
            return Err(CacheError::Backend(format!("HTTP {status}: {err}")));
        }
        if !status.is_success() {
            return Err(CacheError::Backend(format!("HTTP {status}")));
        }
        Ok(reply.result.unwrap_or(Value::Null))
    }
}

#[async_trait]
impl CacheBackend for RestKvCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, CacheError> {
        match self.command(json!(["GET", key.as_str()])).await? {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s)),
            other => Err(CacheError::Serialization(format!(
                "GET returned non-string value: {other}"
            ))),
        }
    }

    async fn set(&self, key: &CacheKey, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let ttl_ms = ttl.as_millis() as u64;
        if ttl_ms == 0 {
            // would expire immediately; the store rejects PX 0 anyway
            return Ok(());
        }
        self.command(json!(["SET", key.as_str(), value, "PX", ttl_ms]))
            .await?;
        Ok(())
    }

    async fn delete(&self, key: &CacheKey) -> Result<bool, CacheError> {
        let removed = self.command(json!(["DEL", key.as_str()])).await?;
        Ok(removed.as_u64().unwrap_or(0) > 0)
    }

    fn name(&self) -> &'static str {
        "rest-kv"
    }
}
