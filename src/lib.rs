//! # talent-query
//!
//! Cached, credit-metered natural-language search for a recruiting marketplace.
//!
//! A recruiter types something like *"senior backend engineer, 5+ years, remote
//! from Portugal"*; the service asks a language model to turn it into
//! [`JobAttributes`] filters and bills the recruiter's credit balance for the
//! call. Identical queries within the cache TTL are answered from a key-value
//! store and are not billed again.
//!
//! ## Guarantees
//!
//! - A cache hit never debits credits and never calls the model.
//! - A failed model call is refunded before the error is returned.
//! - A missing or failing cache store only removes the speed-up; metering and
//!   results are unaffected.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use talent_query::{AppConfig, Caller, InMemoryLedger, NaturalLanguageQueryService};
//!
//! #[tokio::main]
//! async fn main() -> talent_query::Result<()> {
//!     let config = AppConfig::from_env()?;
//!     let ledger = Arc::new(InMemoryLedger::new().with_user("recruiter-1", 10));
//!     let service = NaturalLanguageQueryService::from_app_config(&config, ledger)?;
//!
//!     let attrs = service
//!         .natural_language_query(&Caller::new("recruiter-1"), "rust engineer in Berlin")
//!         .await?;
//!     println!("{}", serde_json::to_string_pretty(&attrs)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`cache`] | Key derivation, KV backends, fail-soft store, cache-aside |
//! | [`credits`] | Credit ledger seam and in-memory ledger |
//! | [`generator`] | Model invocation seam and OpenAI-compatible client |
//! | [`structured`] | Schema derivation, JSON mode, output validation |
//! | [`attributes`] | The `JobAttributes` wire contract |
//! | [`query`] | The metered query procedure |
//! | [`config`] | Process configuration |

pub mod attributes;
pub mod cache;
pub mod config;
pub mod credits;
pub mod error_code;
pub mod generator;
pub mod query;
pub mod structured;

pub use attributes::JobAttributes;
pub use cache::{CacheKey, CacheManager, CacheOutcome};
pub use config::AppConfig;
pub use credits::{CreditLedger, InMemoryLedger};
pub use generator::{OpenAiGenerator, StructuredGenerator};
pub use query::{Caller, NaturalLanguageQueryService};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
pub use error_code::ErrorCode;
