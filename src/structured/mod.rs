//! Structured output: schema derivation, request options and reply validation.
//!
//! - [`json_schema_from_type`]: JSON schema from a `schemars` type
//! - [`JsonModeConfig`]: `response_format` for OpenAI-compatible requests
//! - [`OutputValidator`]: compiled schema check plus typed deserialization
//!
//! # Examples
//!
//! ```
//! use talent_query::structured::OutputValidator;
//! use serde_json::json;
//!
//! let validator = OutputValidator::new(json!({
//!     "type": "object",
//!     "properties": { "role": {"type": "string"} },
//!     "required": ["role"]
//! }))
//! .unwrap();
//!
//! assert!(validator.validate(&json!({"role": "Designer"})).is_ok());
//! assert!(validator.validate(&json!({"role": 3})).is_err());
//! ```

pub mod error;
pub mod json_mode;
pub mod schema;
pub mod validator;

pub use error::{join_errors, ValidationError};
pub use json_mode::{extract_json, JsonModeConfig};
pub use schema::{json_schema_from_type, schema_name};
pub use validator::OutputValidator;
