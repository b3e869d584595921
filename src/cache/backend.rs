//! Cache backend trait and the in-process implementation.

use super::key::CacheKey;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Failure talking to a cache backend. Never surfaced past [`CacheManager`](super::CacheManager).
#[derive(Debug, Error)]
pub enum CacheError {
    /// Connection, auth or command error
    #[error("cache backend: {0}")]
    Backend(String),
    /// Value could not be encoded or decoded
    #[error("serialization: {0}")]
    Serialization(String),
}

/// A key-value store holding JSON text with per-entry expiry.
///
/// Backends report their failures; absorbing them is the manager's job.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Returns the stored value, or `None` if absent or expired.
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, CacheError>;
    /// Stores `value` under `key`, replacing any previous value (last write wins).
    async fn set(&self, key: &CacheKey, value: &str, ttl: Duration) -> Result<(), CacheError>;
    /// Removes `key`. Returns whether an entry was present.
    async fn delete(&self, key: &CacheKey) -> Result<bool, CacheError>;
    fn name(&self) -> &'static str;
}

#[derive(Clone)]
struct CacheEntry {
    data: String,
    created_at: Instant,
    ttl: Duration,
    last_accessed: Instant,
}

impl CacheEntry {
    fn new(data: String, ttl: Duration) -> Self {
        let now = Instant::now();
        Self {
            data,
            created_at: now,
            ttl,
            last_accessed: now,
        }
    }

    // An entry is live for strictly less than its ttl; a zero ttl is never readable.
    fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.ttl
    }
}

/// Bounded in-process cache. Useful for single-node deployments and tests.
pub struct MemoryCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
    max_entries: usize,
}

impl MemoryCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            max_entries: max_entries.max(1),
        }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .map(|entries| entries.values().filter(|e| !e.is_expired()).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn evict_if_needed(&self, entries: &mut HashMap<String, CacheEntry>) {
        entries.retain(|_, e| !e.is_expired());
        while entries.len() >= self.max_entries {
            let oldest = entries
                .iter()
                .min_by_key(|(_, e)| e.last_accessed)
                .map(|(k, _)| k.clone());
            if let Some(k) = oldest {
                entries.remove(&k);
            } else {
                break;
            }
        }
    }
}

fn poisoned() -> CacheError {
    CacheError::Backend("memory cache lock poisoned".to_string())
}

#[async_trait]
impl CacheBackend for MemoryCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, CacheError> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        if let Some(entry) = entries.get_mut(key.as_str()) {
            if entry.is_expired() {
                entries.remove(key.as_str());
                return Ok(None);
            }
            entry.last_accessed = Instant::now();
            return Ok(Some(entry.data.clone()));
        }
        Ok(None)
    }

    async fn set(&self, key: &CacheKey, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        if !entries.contains_key(key.as_str()) {
            self.evict_if_needed(&mut entries);
        }
        entries.insert(
            key.as_str().to_string(),
            CacheEntry::new(value.to_string(), ttl),
        );
        Ok(())
    }

    async fn delete(&self, key: &CacheKey) -> Result<bool, CacheError> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        Ok(entries.remove(key.as_str()).is_some())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
