//! Fail-soft cache store.

use super::backend::{CacheBackend, CacheError};
use super::key::CacheKey;
use super::rest::RestKvCache;
use crate::config::KvStoreConfig;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    pub deletes: u64,
    /// Backend or decoding failures that were absorbed.
    pub errors: u64,
}

impl CacheStats {
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Default)]
struct AtomicStats {
    hits: AtomicU64,
    misses: AtomicU64,
    sets: AtomicU64,
    deletes: AtomicU64,
    errors: AtomicU64,
}

impl AtomicStats {
    fn to_stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            sets: self.sets.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

/// Typed, fail-soft front for an optional [`CacheBackend`].
///
/// Without a backend every read is a miss and every write is dropped. With a
/// backend, any [`CacheError`] is logged and converted into the same
/// miss/no-op behavior; none of these methods can fail the caller.
#[derive(Clone)]
pub struct CacheManager {
    backend: Option<Arc<dyn CacheBackend>>,
    stats: Arc<AtomicStats>,
}

impl CacheManager {
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self {
            backend: Some(backend),
            stats: Arc::new(AtomicStats::default()),
        }
    }

    /// A manager with no store behind it.
    pub fn disabled() -> Self {
        Self {
            backend: None,
            stats: Arc::new(AtomicStats::default()),
        }
    }

    /// Connects to the REST KV store when configured, otherwise returns a
    /// disabled manager. A store that cannot be set up also yields a disabled
    /// manager rather than an error.
    pub fn from_config(config: Option<&KvStoreConfig>) -> Self {
        let Some(config) = config else {
            debug!("kv store not configured; caching disabled");
            return Self::disabled();
        };
        match RestKvCache::new(config) {
            Ok(backend) => Self::new(Arc::new(backend)),
            Err(e) => {
                warn!(error = %e, "kv store unavailable; caching disabled");
                Self::disabled()
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.as_ref().map_or("disabled", |b| b.name())
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.to_stats()
    }

    /// Returns the cached value for `key`, or `None` on miss, expiry, backend
    /// failure or undecodable payload.
    pub async fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let backend = self.backend.as_ref()?;
        match backend.get(key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => {
                    self.stats.hits.fetch_add(1, Ordering::Relaxed);
                    debug!(cache_key = %key, "cache hit");
                    Some(value)
                }
                Err(e) => {
                    self.record_error("get", key, &CacheError::Serialization(e.to_string()));
                    self.stats.misses.fetch_add(1, Ordering::Relaxed);
                    None
                }
            },
            Ok(None) => {
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                debug!(cache_key = %key, "cache miss");
                None
            }
            Err(e) => {
                self.record_error("get", key, &e);
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Stores `value` with expiry `ttl`. Failures are logged and dropped.
    pub async fn set<T: Serialize>(&self, key: &CacheKey, value: &T, ttl: Duration) {
        let Some(backend) = self.backend.as_ref() else {
            return;
        };
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                self.record_error("set", key, &CacheError::Serialization(e.to_string()));
                return;
            }
        };
        match backend.set(key, &raw, ttl).await {
            Ok(()) => {
                self.stats.sets.fetch_add(1, Ordering::Relaxed);
                debug!(cache_key = %key, ttl_secs = ttl.as_secs(), "cached value");
            }
            Err(e) => self.record_error("set", key, &e),
        }
    }

    /// Removes `key`. Failures are logged and dropped.
    pub async fn delete(&self, key: &CacheKey) {
        let Some(backend) = self.backend.as_ref() else {
            return;
        };
        match backend.delete(key).await {
            Ok(removed) => {
                if removed {
                    self.stats.deletes.fetch_add(1, Ordering::Relaxed);
                }
                debug!(cache_key = %key, removed, "cache delete");
            }
            Err(e) => self.record_error("delete", key, &e),
        }
    }

    pub(super) fn record_error(&self, op: &'static str, key: &CacheKey, error: &dyn std::fmt::Display) {
        self.stats.errors.fetch_add(1, Ordering::Relaxed);
        warn!(op, cache_key = %key, error = %error, "cache operation failed; continuing uncached");
    }
}
