//! Cache-aside orchestration.

use super::key::CacheKey;
use super::manager::CacheManager;
use futures::FutureExt;
use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

/// Result of [`CacheManager::get_or_compute`].
///
/// `served_from_cache` is for the caller's own decisions (throttling, logging);
/// it is not part of any response payload.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheOutcome<T> {
    pub data: T,
    pub served_from_cache: bool,
}

impl<T> CacheOutcome<T> {
    pub fn hit(data: T) -> Self {
        Self {
            data,
            served_from_cache: true,
        }
    }

    pub fn miss(data: T) -> Self {
        Self {
            data,
            served_from_cache: false,
        }
    }

    pub fn into_inner(self) -> T {
        self.data
    }
}

impl CacheManager {
    /// Returns the cached value for `key`, or runs `compute` and caches its output.
    ///
    /// `compute` is `FnOnce` and runs only on a genuine miss (or when
    /// `disable_cache` is set); a hit never touches it, so side effects inside
    /// it happen at most once per call and never for a hit.
    ///
    /// Store failures, including a panicking backend, degrade to a miss. Errors
    /// from `compute` are returned exactly as produced.
    pub async fn get_or_compute<T, E, F, Fut>(
        &self,
        key: &CacheKey,
        ttl: Duration,
        disable_cache: bool,
        compute: F,
    ) -> Result<CacheOutcome<T>, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if disable_cache {
            return compute().await.map(CacheOutcome::miss);
        }

        match AssertUnwindSafe(self.get::<T>(key)).catch_unwind().await {
            Ok(Some(cached)) => return Ok(CacheOutcome::hit(cached)),
            Ok(None) => {}
            Err(_) => self.record_error("get", key, &"backend panicked"),
        }

        let data = compute().await?;

        if AssertUnwindSafe(self.set(key, &data, ttl))
            .catch_unwind()
            .await
            .is_err()
        {
            self.record_error("set", key, &"backend panicked");
        }

        Ok(CacheOutcome::miss(data))
    }
}
