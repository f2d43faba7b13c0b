//! Cache Module
//!
//! Bounded in-memory cache with LRU eviction and TTL staleness.

mod entry;
mod index;
mod lru;
mod stats;
mod store;


// Re-export public types
pub use entry::{CacheEntry, EntryId};
pub use index::EntryIndex;
pub use lru::RecencyList;
pub use stats::CacheStats;
pub use store::EvictionCache;
