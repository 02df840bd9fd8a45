//! In-process cache backend.
//!
//! Entries live in a `DashMap`. Expired entries are evicted lazily on read.
//! An entry from an older family generation is treated as a miss and removed,
//! which covers a put that raced a family invalidation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use syllabus_core::{LmsResult, ResourceType, SharedClock, SystemClock};

use super::key::CacheKey;
use super::traits::{CacheBackend, CacheEntry, CacheStats};
use super::watermark::{Watermark, WatermarkTable};

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    puts: AtomicU64,
    rejected_puts: AtomicU64,
    deletes: AtomicU64,
    family_invalidations: AtomicU64,
}

/// `DashMap`-backed cache shared by all request handlers.
pub struct InMemoryCacheBackend {
    entries: DashMap<CacheKey, CacheEntry>,
    watermarks: WatermarkTable,
    counters: Counters,
    clock: SharedClock,
}

impl std::fmt::Debug for InMemoryCacheBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryCacheBackend")
            .field("entries", &self.entries.len())
            .finish_non_exhaustive()
    }
}

impl Default for InMemoryCacheBackend {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl InMemoryCacheBackend {
    pub fn new(clock: SharedClock) -> Self {
        Self {
            entries: DashMap::new(),
            watermarks: WatermarkTable::new(),
            counters: Counters::default(),
            clock,
        }
    }

    /// Number of stored entries, live or not yet evicted.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn record_miss(&self) {
        self.counters.misses.fetch_add(1, Ordering::Relaxed);
    }
}

#[async_trait]
impl CacheBackend for InMemoryCacheBackend {
    async fn get(&self, key: &CacheKey) -> LmsResult<Option<CacheEntry>> {
        let Some(entry) = self.entries.get(key).map(|e| e.value().clone()) else {
            self.record_miss();
            return Ok(None);
        };

        let now = self.clock.now();
        let current = self.watermarks.sequence(key.family());
        if entry.is_expired(now) || entry.generation != current {
            self.entries
                .remove_if(key, |_, stored| stored.generation == entry.generation);
            self.record_miss();
            return Ok(None);
        }

        self.counters.hits.fetch_add(1, Ordering::Relaxed);
        Ok(Some(entry))
    }

    async fn put_if_unchanged(&self, mut entry: CacheEntry, observed: Watermark) -> LmsResult<bool> {
        let family = entry.key.family();
        if self.watermarks.sequence(family) != observed.sequence {
            self.counters.rejected_puts.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(key = %entry.key, "cache put rejected, family invalidated meanwhile");
            return Ok(false);
        }

        entry.generation = observed.sequence;
        self.entries.insert(entry.key.clone(), entry);
        self.counters.puts.fetch_add(1, Ordering::Relaxed);
        Ok(true)
    }

    async fn delete(&self, key: &CacheKey) -> LmsResult<bool> {
        let removed = self.entries.remove(key).is_some();
        if removed {
            self.counters.deletes.fetch_add(1, Ordering::Relaxed);
        }
        Ok(removed)
    }

    async fn delete_family(&self, family: ResourceType) -> LmsResult<u64> {
        self.watermarks.bump(family, self.clock.now());

        let before = self.entries.len();
        self.entries.retain(|key, _| key.family() != family);
        let removed = before.saturating_sub(self.entries.len()) as u64;

        self.counters
            .family_invalidations
            .fetch_add(1, Ordering::Relaxed);
        self.counters.deletes.fetch_add(removed, Ordering::Relaxed);
        Ok(removed)
    }

    async fn watermark(&self, family: ResourceType) -> LmsResult<Watermark> {
        Ok(self.watermarks.current(family, self.clock.now()))
    }

    async fn stats(&self) -> LmsResult<CacheStats> {
        Ok(CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            puts: self.counters.puts.load(Ordering::Relaxed),
            rejected_puts: self.counters.rejected_puts.load(Ordering::Relaxed),
            deletes: self.counters.deletes.load(Ordering::Relaxed),
            family_invalidations: self.counters.family_invalidations.load(Ordering::Relaxed),
            entry_count: self.entries.len() as u64,
        })
    }
}
