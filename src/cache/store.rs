//! Eviction Cache Module
//!
//! Bounded, time-aware cache combining the recency list and the entry index.
//!
//! Expiry is lazy: a stale entry is only reclaimed when a lookup discovers
//! it, or by a sweep from the LRU end when a new key needs room. Because every
//! touch moves an entry to the front with a fresh timestamp, the list is
//! ordered newest to oldest and the sweep can stop at the first fresh entry.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::cache::entry::{CacheEntry, EntryId};
use crate::cache::index::EntryIndex;
use crate::cache::lru::RecencyList;
use crate::cache::CacheStats;
use crate::error::{ProxyError, Result};

/// Upper bound on slots reserved up front; larger caches grow on demand.
const PREALLOCATE_LIMIT: usize = 4096;

// == Eviction Cache ==
/// LRU cache whose entries also expire `ttl` after their last touch.
///
/// Not internally synchronized; callers serialize access (see
/// [`crate::tasks::spawn_proxy_worker`]).
#[derive(Debug)]
pub struct EvictionCache {
    index: EntryIndex,
    recency: RecencyList,
    stats: CacheStats,
    capacity: usize,
    ttl: Duration,
}

impl EvictionCache {
    // == Constructor ==
    /// Creates an empty cache holding at most `capacity` entries, each valid
    /// for `ttl` after its last touch.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let reserve = capacity.min(PREALLOCATE_LIMIT);
        Self {
            index: EntryIndex::with_capacity(reserve),
            recency: RecencyList::with_capacity(reserve),
            stats: CacheStats::new(),
            capacity,
            ttl,
        }
    }

    /// Creates a cache from raw, possibly negative, settings.
    ///
    /// # Errors
    /// `ProxyError::InvalidArgument` if `capacity` or `ttl_millis` is negative.
    pub fn try_new(capacity: i64, ttl_millis: i64) -> Result<Self> {
        let capacity = usize::try_from(capacity)
            .map_err(|_| ProxyError::InvalidArgument("Invalid cache capacity".to_string()))?;
        let ttl_millis = u64::try_from(ttl_millis).map_err(|_| {
            ProxyError::InvalidArgument("Global expiry cannot be negative".to_string())
        })?;
        Ok(Self::new(capacity, Duration::from_millis(ttl_millis)))
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    // == Set ==
    /// Stores `value` under `key`.
    ///
    /// An existing key is updated in place and promoted. A new key first
    /// reclaims stale entries if the cache is full, then evicts the least
    /// recently used entry if it is still full.
    pub fn set(&mut self, key: String, value: String) {
        self.set_at(key, value, Instant::now());
    }

    pub(crate) fn set_at(&mut self, key: String, value: String, now: Instant) {
        if let Some(id) = self.index.get(&key) {
            if let Some(entry) = self.recency.get_mut(id) {
                entry.value = value;
            }
            self.recency.move_to_front(id, now);
            return;
        }

        if self.index.len() >= self.capacity {
            self.sweep_stale_at(now);
        }
        if self.index.len() >= self.capacity {
            self.evict_lru();
        }
        if self.capacity == 0 {
            debug!(key = %key, "Zero-capacity cache, entry not retained");
            return;
        }

        let id = self.recency.push_front(CacheEntry::new(key.clone(), value, now));
        self.index.insert(key, id);
    }

    // == Get ==
    /// Returns the cached value for `key` if present and fresh.
    ///
    /// A fresh hit is promoted to most recently used. A stale hit is removed
    /// and reported as absent.
    pub fn get(&mut self, key: &str) -> Option<String> {
        self.get_at(key, Instant::now())
    }

    pub(crate) fn get_at(&mut self, key: &str, now: Instant) -> Option<String> {
        let Some(id) = self.index.get(key) else {
            self.stats.record_miss();
            return None;
        };

        let stale = self
            .recency
            .get(id)
            .map_or(true, |entry| entry.is_stale(self.ttl, now));
        if stale {
            debug!(key = %key, "Discarding stale entry on lookup");
            self.remove_entry(id);
            self.stats.record_expirations(1);
            self.stats.record_miss();
            return None;
        }

        self.recency.move_to_front(id, now);
        self.stats.record_hit();
        self.recency.get(id).map(|entry| entry.value.clone())
    }

    // == Contains Valid Entry ==
    /// Returns true if `get(key)` would currently return a value.
    ///
    /// Read-only: neither recency order nor size changes. May return false for
    /// entries still counted by [`len`](Self::len).
    pub fn contains_valid_entry(&self, key: &str) -> bool {
        self.contains_valid_entry_at(key, Instant::now())
    }

    pub(crate) fn contains_valid_entry_at(&self, key: &str, now: Instant) -> bool {
        self.index
            .get(key)
            .and_then(|id| self.recency.get(id))
            .is_some_and(|entry| !entry.is_stale(self.ttl, now))
    }

    // == Length ==
    /// Number of entries held, including stale ones not yet discovered.
    ///
    /// Only exact as of the most recent `get`/`set`/sweep; an upper bound on
    /// the number of live entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    // == Sweep ==
    /// Removes stale entries from the LRU end, stopping at the first fresh
    /// entry. Returns the number removed.
    pub fn clear_stale_entries(&mut self) -> usize {
        self.sweep_stale_at(Instant::now())
    }

    pub(crate) fn sweep_stale_at(&mut self, now: Instant) -> usize {
        let mut removed = 0;
        while let Some(back) = self.recency.back() {
            let stale = self
                .recency
                .get(back)
                .map_or(false, |entry| entry.is_stale(self.ttl, now));
            if !stale {
                break;
            }
            self.remove_entry(back);
            removed += 1;
        }
        if removed > 0 {
            debug!(removed, "Swept stale entries from LRU end");
            self.stats.record_expirations(removed);
        }
        removed
    }

    // == Stats ==
    /// Returns a snapshot of the cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.index.len());
        stats
    }

    /// Keys from most to least recently used.
    pub fn keys(&self) -> Vec<String> {
        self.recency.iter().map(|entry| entry.key().to_string()).collect()
    }

    /// Evicts the entry at the back of the recency list.
    fn evict_lru(&mut self) {
        if let Some(back) = self.recency.back() {
            if let Some(entry) = self.remove_entry(back) {
                debug!(key = %entry.key(), "Evicted least recently used entry");
                self.stats.record_eviction();
            }
        }
    }

    /// Removes `id` from both the list and the index.
    fn remove_entry(&mut self, id: EntryId) -> Option<CacheEntry> {
        let entry = self.recency.remove(id);
        debug_assert!(entry.is_some(), "indexed entry missing from recency list");
        if let Some(entry) = &entry {
            self.index.remove(entry.key());
        }
        debug_assert_eq!(self.index.len(), self.recency.len());
        entry
    }

    #[cfg(test)]
    pub(crate) fn debug_validate_invariants(&self) {
        self.recency.debug_validate_invariants();
        assert_eq!(self.index.len(), self.recency.len());
        assert!(self.index.len() <= self.capacity);
        let mut last: Option<Instant> = None;
        for entry in self.recency.iter() {
            let indexed = self
                .index
                .get(entry.key())
                .and_then(|id| self.recency.get(id))
                .map(|e| e.key());
            assert_eq!(indexed, Some(entry.key()));
            if let Some(newer) = last {
                assert!(entry.last_touched <= newer, "recency list out of timestamp order");
            }
            last = Some(entry.last_touched);
        }
    }
}
