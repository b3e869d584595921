//! Schema generation utilities.

use serde_json::json;

/// JSON schema for `T`, derived from its `schemars` implementation.
pub fn json_schema_from_type<T: schemars::JsonSchema>() -> serde_json::Value {
    let schema = schemars::schema_for!(T);
    serde_json::to_value(&schema).unwrap_or_else(|_| json!({}))
}

/// Schema title, falling back to `fallback` when the schema has none.
pub fn schema_name(schema: &serde_json::Value, fallback: &str) -> String {
    schema
        .get("title")
        .and_then(|t| t.as_str())
        .unwrap_or(fallback)
        .to_string()
}
