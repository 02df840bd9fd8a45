//! Cache backend trait and shared value types.
//!
//! Values are stored as `serde_json::Value` so the backend stays object safe
//! and can be shared as `Arc<dyn CacheBackend>` by every service.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use syllabus_core::{LmsResult, ResourceType};

use super::key::CacheKey;
use super::watermark::Watermark;

/// One cached read result.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub key: CacheKey,
    pub value: Value,
    pub inserted_at: DateTime<Utc>,
    pub ttl: Duration,
    /// Family sequence the value was computed under.
    pub generation: i64,
}

impl CacheEntry {
    /// Whether the entry has outlived its ttl at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        let age = now
            .signed_duration_since(self.inserted_at)
            .to_std()
            .unwrap_or(Duration::ZERO);
        age >= self.ttl
    }
}

/// Cache backend for pluggable cache implementations.
///
/// Implementations must be safe under concurrent access. An entry whose
/// generation no longer matches its family's watermark must never be
/// returned from [`get`](CacheBackend::get).
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Live, current-generation entry for `key`.
    async fn get(&self, key: &CacheKey) -> LmsResult<Option<CacheEntry>>;

    /// Store `entry` only if its family is still at `observed`.
    ///
    /// Returns whether the entry was stored.
    async fn put_if_unchanged(&self, entry: CacheEntry, observed: Watermark) -> LmsResult<bool>;

    /// Remove one key. Returns whether anything was removed.
    async fn delete(&self, key: &CacheKey) -> LmsResult<bool>;

    /// Advance the family watermark, then drop every entry of the family.
    ///
    /// Returns the number of entries removed.
    async fn delete_family(&self, family: ResourceType) -> LmsResult<u64>;

    /// Current watermark of `family`.
    async fn watermark(&self, family: ResourceType) -> LmsResult<Watermark>;

    async fn stats(&self) -> LmsResult<CacheStats>;
}

/// Statistics about cache usage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub puts: u64,
    /// Puts refused because the family moved on while computing.
    pub rejected_puts: u64,
    pub deletes: u64,
    pub family_invalidations: u64,
    pub entry_count: u64,
}

impl CacheStats {
    /// Hit rate in `0.0..=1.0`.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_cache_stats_hit_rate() {
        let stats = CacheStats {
            hits: 80,
            misses: 20,
            ..Default::default()
        };
        assert!((stats.hit_rate() - 0.8).abs() < 0.001);

        let empty_stats = CacheStats::default();
        assert!((empty_stats.hit_rate() - 0.0).abs() < 0.001);
    }

    #[test]
    fn test_entry_expiry_boundary() {
        let inserted_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let entry = CacheEntry {
            key: CacheKey::detail(ResourceType::Course, 1),
            value: Value::Null,
            inserted_at,
            ttl: Duration::from_secs(300),
            generation: 0,
        };

        assert!(!entry.is_expired(inserted_at));
        assert!(!entry.is_expired(inserted_at + chrono::Duration::seconds(299)));
        assert!(entry.is_expired(inserted_at + chrono::Duration::seconds(300)));
    }
}
