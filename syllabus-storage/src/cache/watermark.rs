//! Per-family watermarks for cache invalidation.
//!
//! Each resource family carries a monotonically increasing sequence. An
//! invalidation bumps the family's sequence before any entry is deleted, and
//! every cached entry remembers the sequence it was computed under. A reader
//! that observed sequence `n` may only store its result while the family is
//! still at `n`, so a value computed before an invalidation can never land in
//! the cache after it.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use syllabus_core::ResourceType;

/// A point in one family's invalidation history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Watermark {
    /// Bumped once per family invalidation.
    pub sequence: i64,
    pub observed_at: DateTime<Utc>,
}

impl Watermark {
    pub fn with_timestamp(sequence: i64, observed_at: DateTime<Utc>) -> Self {
        Self {
            sequence,
            observed_at,
        }
    }

    /// Beginning of time.
    pub fn zero() -> Self {
        Self {
            sequence: 0,
            observed_at: DateTime::UNIX_EPOCH,
        }
    }
}

impl Default for Watermark {
    fn default() -> Self {
        Self::zero()
    }
}

/// Current sequence of every resource family.
#[derive(Debug, Default)]
pub struct WatermarkTable {
    sequences: DashMap<ResourceType, i64>,
}

impl WatermarkTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current sequence of `family`; zero if it was never invalidated.
    pub fn sequence(&self, family: ResourceType) -> i64 {
        self.sequences.get(&family).map(|s| *s).unwrap_or(0)
    }

    /// Current watermark of `family`, stamped with `observed_at`.
    pub fn current(&self, family: ResourceType, observed_at: DateTime<Utc>) -> Watermark {
        Watermark::with_timestamp(self.sequence(family), observed_at)
    }

    /// Advance `family` by one and return the new watermark.
    pub fn bump(&self, family: ResourceType, observed_at: DateTime<Utc>) -> Watermark {
        let mut entry = self.sequences.entry(family).or_insert(0);
        *entry += 1;
        Watermark::with_timestamp(*entry, observed_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watermark_ordering() {
        let now = Utc::now();
        let w1 = Watermark::with_timestamp(1, now);
        let w2 = Watermark::with_timestamp(2, now);

        assert!(w2.sequence > w1.sequence);
        assert_ne!(w1, w2);
        assert_eq!(Watermark::default(), Watermark::zero());
    }

    #[test]
    fn test_bump_is_per_family() {
        let table = WatermarkTable::new();
        let now = Utc::now();

        assert_eq!(table.sequence(ResourceType::Course), 0);
        assert_eq!(table.bump(ResourceType::Course, now).sequence, 1);
        assert_eq!(table.bump(ResourceType::Course, now).sequence, 2);

        assert_eq!(table.sequence(ResourceType::Course), 2);
        assert_eq!(table.sequence(ResourceType::Lesson), 0);
        assert_eq!(table.current(ResourceType::Course, now).sequence, 2);
    }
}
