//! Cache-aside layer over an optional key-value store.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`CacheKey`] / [`derive_key`] | Namespaced SHA-256 keys from normalized free text |
//! | [`CacheBackend`] | Trait for key-value stores with per-entry TTL |
//! | [`RestKvCache`] | Redis-over-REST store reached by URL + token |
//! | [`MemoryCache`] | Bounded in-process store |
//! | [`CacheManager`] | Fail-soft typed store front with statistics |
//! | [`CacheOutcome`] | Value plus hit/miss flag from [`CacheManager::get_or_compute`] |
//!
//! Caching is an optimization only: a manager without a backend, or with a
//! failing one, behaves as a permanently empty cache and never returns an error.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use talent_query::cache::{CacheKey, CacheManager, MemoryCache};
//!
//! # tokio_test::block_on(async {
//! let cache = CacheManager::new(Arc::new(MemoryCache::new(1000)));
//! let key = CacheKey::derive("AI job attributes", "Rust engineer in Lisbon");
//!
//! let outcome = cache
//!     .get_or_compute(&key, Duration::from_secs(1800), false, || async {
//!         Ok::<_, std::convert::Infallible>(vec!["rust".to_string()])
//!     })
//!     .await
//!     .unwrap();
//! assert!(!outcome.served_from_cache);
//! # });
//! ```

mod aside;
mod backend;
mod key;
mod manager;
mod rest;

pub use aside::CacheOutcome;
pub use backend::{CacheBackend, CacheError, MemoryCache};
pub use key::{derive_key, CacheKey, DIGEST_HEX_LEN};
pub use manager::{CacheManager, CacheStats};
pub use rest::RestKvCache;
