//! Text-to-structured-object model invocation.
//!
//! The query service treats the model as an opaque, fallible function:
//! system prompt + JSON schema + user text in, JSON object out. The returned
//! object is not trusted; the caller validates it against the schema.

mod openai;

pub use openai::OpenAiGenerator;

use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[async_trait]
pub trait StructuredGenerator: Send + Sync {
    async fn generate(&self, system_prompt: &str, schema: &Value, user_message: &str)
        -> Result<Value>;

    fn name(&self) -> &str;
}

/// Chat message in OpenAI wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: text.into(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
}
