//! Read-through cache over list and detail queries.
//!
//! A hit returns the stored value without touching the backing store. A miss
//! observes the family watermark, computes the value, and stores it only if
//! the family has not been invalidated in the meantime. Failed computations
//! are never cached.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use syllabus_core::{CacheError, LmsResult, SharedClock};

use super::freshness::CacheRead;
use super::key::CacheKey;
use super::traits::{CacheBackend, CacheEntry};

/// Default ttl for list and detail entries.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Configuration for the read-through cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    pub list_ttl: Duration,
    pub detail_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            list_ttl: DEFAULT_TTL,
            detail_ttl: DEFAULT_TTL,
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_list_ttl(mut self, ttl: Duration) -> Self {
        self.list_ttl = ttl;
        self
    }

    pub fn with_detail_ttl(mut self, ttl: Duration) -> Self {
        self.detail_ttl = ttl;
        self
    }

    /// Ttl that applies to `key`.
    pub fn ttl_for(&self, key: &CacheKey) -> Duration {
        if key.is_list() {
            self.list_ttl
        } else {
            self.detail_ttl
        }
    }
}

/// Read-through cache shared by every resource service.
#[derive(Clone)]
pub struct ReadThroughCache {
    backend: Arc<dyn CacheBackend>,
    clock: SharedClock,
    config: CacheConfig,
}

impl std::fmt::Debug for ReadThroughCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadThroughCache")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ReadThroughCache {
    pub fn new(backend: Arc<dyn CacheBackend>, clock: SharedClock, config: CacheConfig) -> Self {
        Self {
            backend,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn backend(&self) -> &Arc<dyn CacheBackend> {
        &self.backend
    }

    /// [`get_or_compute`](Self::get_or_compute) with the configured ttl for
    /// the key's kind.
    pub async fn read<T, F, Fut>(&self, key: CacheKey, compute: F) -> LmsResult<CacheRead<T>>
    where
        T: Serialize + DeserializeOwned,
        F: Fn() -> Fut,
        Fut: Future<Output = LmsResult<T>>,
    {
        let ttl = self.config.ttl_for(&key);
        self.get_or_compute(key, ttl, compute).await
    }

    /// Return the live value under `key`, or compute, store and return it.
    ///
    /// `compute` is retried once when it fails with a backing store failure.
    /// Any error is returned unchanged and leaves the key empty.
    pub async fn get_or_compute<T, F, Fut>(
        &self,
        key: CacheKey,
        ttl: Duration,
        compute: F,
    ) -> LmsResult<CacheRead<T>>
    where
        T: Serialize + DeserializeOwned,
        F: Fn() -> Fut,
        Fut: Future<Output = LmsResult<T>>,
    {
        if let Some(entry) = self.backend.get(&key).await? {
            match serde_json::from_value::<T>(entry.value) {
                Ok(value) => {
                    tracing::debug!(key = %key, "cache hit");
                    return Ok(CacheRead::from_cache(value, entry.inserted_at));
                }
                Err(err) => {
                    tracing::warn!(key = %key, error = %err, "cached value no longer decodes, recomputing");
                    self.backend.delete(&key).await?;
                }
            }
        }

        tracing::debug!(key = %key, "cache miss");
        let observed = self.backend.watermark(key.family()).await?;

        let value = match compute().await {
            Err(err) if err.is_backing_store_failure() => {
                tracing::warn!(key = %key, error = %err, "backing store read failed, retrying once");
                compute().await?
            }
            other => other?,
        };

        let encoded = serde_json::to_value(&value).map_err(|e| CacheError::Encode {
            key: key.to_string(),
            reason: e.to_string(),
        })?;

        let computed_at = self.clock.now();
        let entry = CacheEntry {
            key,
            value: encoded,
            inserted_at: computed_at,
            ttl,
            generation: observed.sequence,
        };
        self.backend.put_if_unchanged(entry, observed).await?;

        Ok(CacheRead::from_storage(value, computed_at))
    }
}
