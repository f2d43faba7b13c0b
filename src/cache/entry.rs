//! Cache Entry Module
//!
//! Defines the record stored for each cached key and the handle used to
//! address it inside the recency arena.

use std::time::{Duration, Instant};

// == Entry Handle ==
/// Stable handle of an entry slot in the recency arena.
///
/// A handle stays valid until the entry is removed; the slot may then be
/// reused by a later insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(pub(crate) usize);

// == Cache Entry ==
/// A single cached key-value pair linked into the recency list.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    key: String,
    /// The cached payload
    pub value: String,
    /// Refreshed on insert, update and every fresh read
    pub last_touched: Instant,
    pub(crate) prev: Option<EntryId>,
    pub(crate) next: Option<EntryId>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an unlinked entry touched at `now`.
    pub fn new(key: String, value: String, now: Instant) -> Self {
        Self {
            key,
            value,
            last_touched: now,
            prev: None,
            next: None,
        }
    }

    /// The key this entry was created for. Immutable for its lifetime.
    pub fn key(&self) -> &str {
        &self.key
    }

    // == Age ==
    /// Time elapsed since the entry was last touched, saturating at zero.
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_touched)
    }

    // == Is Stale ==
    /// Checks whether the entry has outlived `ttl`.
    ///
    /// Boundary condition: an entry whose age equals `ttl` exactly is still
    /// fresh; it becomes stale only once its age strictly exceeds `ttl`.
    pub fn is_stale(&self, ttl: Duration, now: Instant) -> bool {
        self.age(now) > ttl
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_creation() {
        let now = Instant::now();
        let entry = CacheEntry::new("k".to_string(), "v".to_string(), now);

        assert_eq!(entry.key(), "k");
        assert_eq!(entry.value, "v");
        assert_eq!(entry.last_touched, now);
        assert!(entry.prev.is_none());
        assert!(entry.next.is_none());
    }

    #[test]
    fn test_entry_fresh_within_ttl() {
        let now = Instant::now();
        let entry = CacheEntry::new("k".to_string(), "v".to_string(), now);

        assert!(!entry.is_stale(Duration::from_millis(100), now));
        assert!(!entry.is_stale(Duration::from_millis(100), now + Duration::from_millis(50)));
    }

    #[test]
    fn test_stale_boundary_condition() {
        let now = Instant::now();
        let entry = CacheEntry::new("k".to_string(), "v".to_string(), now);
        let ttl = Duration::from_millis(100);

        // Age == ttl is still fresh
        assert!(!entry.is_stale(ttl, now + ttl));
        assert!(entry.is_stale(ttl, now + ttl + Duration::from_millis(1)));
    }

    #[test]
    fn test_zero_ttl_stale_after_any_tick() {
        let now = Instant::now();
        let entry = CacheEntry::new("k".to_string(), "v".to_string(), now);

        assert!(!entry.is_stale(Duration::ZERO, now));
        assert!(entry.is_stale(Duration::ZERO, now + Duration::from_nanos(1)));
    }

    #[test]
    fn test_age_saturates_for_earlier_instant() {
        let now = Instant::now();
        let later = now + Duration::from_secs(1);
        let entry = CacheEntry::new("k".to_string(), "v".to_string(), later);

        assert_eq!(entry.age(now), Duration::ZERO);
    }
}
