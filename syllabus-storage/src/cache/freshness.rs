//! Cache read results.

use chrono::{DateTime, Utc};

/// Result of a read-through lookup, carrying where the value came from.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheRead<T> {
    value: T,
    /// When the value was computed from the backing store.
    cached_at: DateTime<Utc>,
    was_cache_hit: bool,
}

impl<T> CacheRead<T> {
    /// Value served from a live cache entry.
    pub fn from_cache(value: T, cached_at: DateTime<Utc>) -> Self {
        Self {
            value,
            cached_at,
            was_cache_hit: true,
        }
    }

    /// Value freshly computed from the backing store.
    pub fn from_storage(value: T, computed_at: DateTime<Utc>) -> Self {
        Self {
            value,
            cached_at: computed_at,
            was_cache_hit: false,
        }
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn cached_at(&self) -> DateTime<Utc> {
        self.cached_at
    }

    pub fn was_cache_hit(&self) -> bool {
        self.was_cache_hit
    }

    pub fn was_cache_miss(&self) -> bool {
        !self.was_cache_hit
    }

    /// Transform the value, keeping the provenance.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> CacheRead<U> {
        CacheRead {
            value: f(self.value),
            cached_at: self.cached_at,
            was_cache_hit: self.was_cache_hit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_read_provenance() {
        let now = Utc::now();
        let hit = CacheRead::from_cache(5, now);
        assert!(hit.was_cache_hit());
        assert_eq!(hit.cached_at(), now);

        let miss = CacheRead::from_storage("x", now);
        assert!(miss.was_cache_miss());
        assert_eq!(*miss.value(), "x");
    }

    #[test]
    fn test_map_keeps_provenance() {
        let read = CacheRead::from_cache(2, Utc::now()).map(|v| v * 10);
        assert!(read.was_cache_hit());
        assert_eq!(read.into_value(), 20);
    }
}
