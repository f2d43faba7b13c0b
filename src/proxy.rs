//! Proxy Facade
//!
//! Composes the eviction cache with a backing store: reads go through the
//! cache and fall back to the store on a miss, writes go straight to the
//! store and only refresh keys the cache already holds.

use tracing::debug;

use crate::backend::BackingStore;
use crate::cache::{CacheStats, EvictionCache};
use crate::error::Result;

// == Redis Proxy ==
/// Read-through, write-around cache in front of a [`BackingStore`].
pub struct RedisProxy<S> {
    store: S,
    cache: EvictionCache,
}

impl<S: BackingStore> RedisProxy<S> {
    // == Constructor ==
    /// Wraps `store` with a cache of `capacity` keys expiring after
    /// `ttl_millis` milliseconds.
    ///
    /// # Errors
    /// `ProxyError::InvalidArgument` if either setting is negative.
    pub fn new(store: S, capacity: i64, ttl_millis: i64) -> Result<Self> {
        let cache = EvictionCache::try_new(capacity, ttl_millis)?;
        Ok(Self::with_cache(store, cache))
    }

    pub fn with_cache(store: S, cache: EvictionCache) -> Self {
        Self { store, cache }
    }

    // == Set ==
    /// Writes `value` to the backing store.
    ///
    /// If `key` is already cached its value is updated and promoted; an
    /// uncached key is not inserted. The cache is left untouched when the
    /// store write fails.
    pub async fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.store.set(key, value).await?;
        if self.cache.contains_valid_entry(key) {
            self.cache.set(key.to_string(), value.to_string());
        }
        Ok(())
    }

    // == Get ==
    /// Returns the value for `key`, serving fresh cache hits directly and
    /// caching whatever the backing store returns on a miss.
    pub async fn get(&mut self, key: &str) -> Result<Option<String>> {
        if let Some(value) = self.cache.get(key) {
            debug!(key = %key, "Cache hit");
            return Ok(Some(value));
        }

        debug!(key = %key, "Cache miss, reading backing store");
        let value = self.store.get(key).await?;
        if let Some(value) = &value {
            self.cache.set(key.to_string(), value.clone());
        }
        Ok(value)
    }

    // == Passthroughs ==
    /// Number of cached entries, including stale ones not yet reclaimed.
    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }

    pub fn cache_contains_valid_entry(&self, key: &str) -> bool {
        self.cache.contains_valid_entry(key)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn cache(&self) -> &EvictionCache {
        &self.cache
    }

    /// Pings the backing store.
    pub async fn ping(&mut self) -> Result<String> {
        self.store.ping().await
    }

    /// Deletes every key in the backing store. Cached entries are kept.
    pub async fn flush_db(&mut self) -> Result<String> {
        self.store.flush_all().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryStore;
    use crate::error::ProxyError;
    use std::time::Duration;

    fn proxy(capacity: i64, ttl_millis: i64) -> (RedisProxy<MemoryStore>, MemoryStore) {
        let store = MemoryStore::new();
        let proxy = RedisProxy::new(store.clone(), capacity, ttl_millis).unwrap();
        (proxy, store)
    }

    #[test]
    fn test_invalid_cache_size() {
        let result = RedisProxy::new(MemoryStore::new(), -1, 10_000);
        assert!(matches!(result, Err(ProxyError::InvalidArgument(_))));
    }

    #[test]
    fn test_invalid_expiry() {
        let result = RedisProxy::new(MemoryStore::new(), 10, -1);
        assert!(matches!(result, Err(ProxyError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_ping() {
        let (mut proxy, _) = proxy(0, 0);
        assert_eq!(proxy.ping().await.unwrap(), "PONG");
    }

    #[tokio::test]
    async fn test_simple_get_set() {
        let (mut proxy, _) = proxy(10, 10_000);

        assert!(!proxy.cache_contains_valid_entry("newEntry"));
        proxy.set("newEntry", "value").await.unwrap();
        // Write-around: not cached until read
        assert!(!proxy.cache_contains_valid_entry("newEntry"));

        proxy.get("newEntry").await.unwrap();
        assert!(proxy.cache_contains_valid_entry("newEntry"));
        assert_eq!(proxy.get("newEntry").await.unwrap(), Some("value".to_string()));
    }

    #[tokio::test]
    async fn test_update_key() {
        let (mut proxy, _) = proxy(10, 10_000);

        proxy.set("a", "1").await.unwrap();
        proxy.set("a", "2").await.unwrap();

        assert_eq!(proxy.get("a").await.unwrap(), Some("2".to_string()));
        assert_eq!(proxy.cache_size(), 1);
    }

    #[tokio::test]
    async fn test_set_updates_cached_key() {
        let (mut proxy, store) = proxy(10, 10_000);
        proxy.set("a", "1").await.unwrap();
        proxy.get("a").await.unwrap();

        proxy.set("a", "2").await.unwrap();
        let reads = store.reads();
        assert_eq!(proxy.get("a").await.unwrap(), Some("2".to_string()));
        // Served from cache
        assert_eq!(store.reads(), reads);
    }

    #[tokio::test]
    async fn test_cache_hit_skips_store() {
        let (mut proxy, store) = proxy(10, 10_000);
        proxy.set("a", "1").await.unwrap();

        proxy.get("a").await.unwrap();
        proxy.get("a").await.unwrap();
        proxy.get("a").await.unwrap();
        assert_eq!(store.reads(), 1);
    }

    #[tokio::test]
    async fn test_missing_key_is_not_cached() {
        let (mut proxy, _) = proxy(10, 10_000);

        assert_eq!(proxy.get("missing").await.unwrap(), None);
        assert_eq!(proxy.cache_size(), 0);
    }

    #[tokio::test]
    async fn test_simple_timeout() {
        let (mut proxy, _) = proxy(10, 100);

        proxy.set("a", "1").await.unwrap();
        proxy.get("a").await.unwrap();
        assert_eq!(proxy.cache_size(), 1);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!proxy.cache_contains_valid_entry("a"));
        // Stale hit falls through to the store
        assert_eq!(proxy.get("a").await.unwrap(), Some("1".to_string()));
    }

    #[tokio::test]
    async fn test_set_leaves_stale_entry_for_get() {
        let (mut proxy, store) = proxy(10, 50);
        proxy.set("a", "1").await.unwrap();
        proxy.get("a").await.unwrap();
        assert_eq!(store.reads(), 1);

        tokio::time::sleep(Duration::from_millis(100)).await;
        proxy.set("a", "2").await.unwrap();

        // Stale entry is neither refreshed nor reclaimed by the write
        assert!(!proxy.cache_contains_valid_entry("a"));
        assert_eq!(proxy.cache_size(), 1);

        assert_eq!(proxy.get("a").await.unwrap(), Some("2".to_string()));
        assert_eq!(store.reads(), 2);
        assert!(proxy.cache_contains_valid_entry("a"));
        assert_eq!(proxy.cache_size(), 1);
    }

    #[tokio::test]
    async fn test_overflow_cache() {
        let (mut proxy, _) = proxy(1, 10_000);

        proxy.set("a", "1").await.unwrap();
        proxy.get("a").await.unwrap();
        assert!(proxy.cache_contains_valid_entry("a"));
        assert_eq!(proxy.cache_size(), 1);

        proxy.set("b", "2").await.unwrap();
        proxy.get("b").await.unwrap();
        assert!(proxy.cache_contains_valid_entry("b"));
        assert!(!proxy.cache_contains_valid_entry("a"));
        assert_eq!(proxy.cache_size(), 1);

        assert_eq!(proxy.get("a").await.unwrap(), Some("1".to_string()));
        assert_eq!(proxy.get("b").await.unwrap(), Some("2".to_string()));
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let (mut proxy, store) = proxy(10, 10_000);
        store.set_unavailable(true);

        assert!(matches!(proxy.set("a", "1").await, Err(ProxyError::Backend(_))));
        assert!(matches!(proxy.get("a").await, Err(ProxyError::Backend(_))));
        assert_eq!(proxy.cache_size(), 0);
    }

    #[tokio::test]
    async fn test_failed_write_leaves_cache_untouched() {
        let (mut proxy, store) = proxy(10, 10_000);
        proxy.set("a", "1").await.unwrap();
        proxy.get("a").await.unwrap();

        store.set_unavailable(true);
        assert!(proxy.set("a", "2").await.is_err());
        // Hit served from cache while the store is down
        assert_eq!(proxy.get("a").await.unwrap(), Some("1".to_string()));
    }

    #[tokio::test]
    async fn test_flush_db() {
        let (mut proxy, store) = proxy(10, 10_000);
        proxy.set("a", "1").await.unwrap();

        assert_eq!(proxy.flush_db().await.unwrap(), "OK");
        assert_eq!(store.peek("a").await, None);
    }
}
