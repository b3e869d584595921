//! Metered natural-language query procedure.
//!
//! Per request: derive the cache key from the raw query, then answer from the
//! cache or, on a miss, check the balance, debit, call the model and refund on
//! failure. Cached answers are returned after a short fixed pause so that
//! response timing does not reveal which queries were free.
//!
//! Two concurrent misses for the same query both compute and both bill; no
//! in-flight marker is kept.

mod prompt;
mod service;

pub use prompt::SYSTEM_PROMPT;
pub use service::{Caller, NaturalLanguageQueryService, QueryServiceBuilder};
