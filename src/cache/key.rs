//! Cache key derivation.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Length of the hex digest appended to every key prefix.
pub const DIGEST_HEX_LEN: usize = 64;

/// A namespaced cache key: `prefix` followed by the SHA-256 hex digest of the
/// normalized identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derives the key for `identifier` under `prefix`.
    ///
    /// The identifier is trimmed and lowercased before hashing, so queries that
    /// differ only in case or surrounding whitespace share a key.
    pub fn derive(prefix: &str, identifier: &str) -> Self {
        Self(derive_key(prefix, identifier))
    }

    /// Wraps an already-derived key verbatim.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// `prefix + hex(sha256(lowercase(trim(identifier))))`.
pub fn derive_key(prefix: &str, identifier: &str) -> String {
    let normalized = identifier.trim().to_lowercase();
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    let digest: String = hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect();
    let mut key = String::with_capacity(prefix.len() + DIGEST_HEX_LEN);
    key.push_str(prefix);
    key.push_str(&digest);
    key
}
