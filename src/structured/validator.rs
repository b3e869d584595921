//! Compiled JSON-schema validation for model output.

use super::error::ValidationError;
use super::schema::json_schema_from_type;
use jsonschema::{Draft, JSONSchema};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Validates model output against a schema compiled once up front.
pub struct OutputValidator {
    schema: Value,
    compiled: JSONSchema,
}

impl OutputValidator {
    pub fn new(schema: Value) -> Result<Self, ValidationError> {
        let compiled = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(&schema)
            .map_err(|e| {
                ValidationError::without_path(format!("failed to compile schema: {}", e))
            })?;
        Ok(Self { schema, compiled })
    }

    /// Validator for the schema `schemars` derives for `T`.
    pub fn for_type<T: schemars::JsonSchema>() -> Result<Self, ValidationError> {
        Self::new(json_schema_from_type::<T>())
    }

    pub fn schema(&self) -> &Value {
        &self.schema
    }

    pub fn validate(&self, data: &Value) -> Result<(), Vec<ValidationError>> {
        self.compiled.validate(data).map_err(|errors| {
            errors
                .map(|e| ValidationError::with_path(e.to_string(), e.instance_path.to_string()))
                .collect()
        })
    }

    /// Validates an already-parsed value and deserializes it into `T`.
    pub fn parse_value<T: DeserializeOwned>(&self, value: Value) -> Result<T, Vec<ValidationError>> {
        self.validate(&value)?;
        serde_json::from_value(value).map_err(|e| vec![ValidationError::without_path(e.to_string())])
    }
}
