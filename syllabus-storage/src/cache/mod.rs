//! Read-through cache with family invalidation.
//!
//! Reads go through [`ReadThroughCache`], which returns a [`CacheRead<T>`]
//! saying whether the value was served from the cache. Writes call
//! [`InvalidationCoordinator::after_commit`] once the store has committed,
//! which drops every family listed by the mutation's [`InvalidationPlan`].
//!
//! Each family carries a [`Watermark`]. A value is only stored if the family
//! watermark it was computed under is still current, so a slow read can
//! never resurrect data from before a write.
//!
//! # Example
//!
//! ```ignore
//! let key = CacheKey::list(ResourceType::Course, filter.params());
//! let read = cache.read(key, || async { Ok(store.course_list(&filter).await?) }).await?;
//! if read.was_cache_hit() {
//!     tracing::debug!("served from cache");
//! }
//! ```

pub mod freshness;
pub mod invalidation;
pub mod key;
pub mod memory;
pub mod read_through;
pub mod traits;
pub mod watermark;

pub use freshness::CacheRead;
pub use invalidation::{InvalidationCoordinator, InvalidationPlan, MutationKind};
pub use key::{CacheKey, CacheKeyKind};
pub use memory::InMemoryCacheBackend;
pub use read_through::{CacheConfig, ReadThroughCache, DEFAULT_TTL};
pub use traits::{CacheBackend, CacheEntry, CacheStats};
pub use watermark::{Watermark, WatermarkTable};
