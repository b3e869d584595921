//! JSON mode request options and reply extraction.

use regex::Regex;
use serde_json::{json, Value};

/// Schema-constrained JSON output for an OpenAI-compatible chat request.
///
/// Provider-side strict mode stays off: it requires every property to be
/// listed as required, which rejects schemas with optional fields. Replies are
/// validated locally instead.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonModeConfig {
    pub schema: Value,
    pub schema_name: String,
}

impl JsonModeConfig {
    pub fn from_schema(schema: Value, name: impl Into<String>) -> Self {
        Self {
            schema,
            schema_name: name.into(),
        }
    }

    /// The `response_format` value for the request body.
    pub fn to_openai_response_format(&self) -> Value {
        json!({
            "type": "json_schema",
            "json_schema": {
                "name": self.schema_name,
                "strict": false,
                "schema": self.schema
            }
        })
    }
}

/// Parses JSON from a model reply, tolerating markdown fences and prose around
/// the object.
pub fn extract_json(text: &str) -> Option<Value> {
    let text = text.trim();
    if let Ok(parsed) = serde_json::from_str::<Value>(text) {
        return Some(parsed);
    }

    let patterns = [
        r"```json\s*([\s\S]*?)\s*```",
        r"```\s*([\s\S]*?)\s*```",
        r"\{[\s\S]*\}",
    ];

    for pattern in patterns {
        let Ok(re) = Regex::new(pattern) else {
            continue;
        };
        if let Some(captures) = re.captures(text) {
            let candidate = match captures.get(1) {
                Some(inner) => inner.as_str(),
                None => captures.get(0).map_or(text, |c| c.as_str()),
            };
            if let Ok(parsed) = serde_json::from_str::<Value>(candidate.trim()) {
                return Some(parsed);
            }
        }
    }

    None
}
