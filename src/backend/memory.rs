//! In-Memory Backing Store
//!
//! A `HashMap` behind a shared lock. Clones share the same data, so a test
//! can keep one handle to inspect or sabotage the store after handing another
//! to the proxy.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::backend::BackingStore;
use crate::error::{ProxyError, Result};

// == Memory Store ==
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<HashMap<String, String>>>,
    unavailable: Arc<AtomicBool>,
    reads: Arc<AtomicU64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail until re-enabled.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of `get` calls that reached this store.
    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::SeqCst)
    }

    /// Reads a value directly, bypassing any cache in front.
    pub async fn peek(&self, key: &str) -> Option<String> {
        self.data.read().await.get(key).cloned()
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(ProxyError::Backend("store unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl BackingStore for MemoryStore {
    async fn get(&mut self, key: &str) -> Result<Option<String>> {
        self.check_available()?;
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.data.read().await.get(key).cloned())
    }

    async fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.check_available()?;
        self.data
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn ping(&mut self) -> Result<String> {
        self.check_available()?;
        Ok("PONG".to_string())
    }

    async fn flush_all(&mut self) -> Result<String> {
        self.check_available()?;
        self.data.write().await.clear();
        Ok("OK".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        store.set("a", "1").await.unwrap();

        assert_eq!(store.get("a").await.unwrap(), Some("1".to_string()));
        assert_eq!(store.get("b").await.unwrap(), None);
        assert_eq!(store.reads(), 2);
    }

    #[tokio::test]
    async fn test_memory_store_clones_share_data() {
        let mut store = MemoryStore::new();
        let observer = store.clone();
        store.set("a", "1").await.unwrap();

        assert_eq!(observer.peek("a").await, Some("1".to_string()));
    }

    #[tokio::test]
    async fn test_memory_store_flush_and_ping() {
        let mut store = MemoryStore::new();
        store.set("a", "1").await.unwrap();

        assert_eq!(store.ping().await.unwrap(), "PONG");
        assert_eq!(store.flush_all().await.unwrap(), "OK");
        assert_eq!(store.peek("a").await, None);
    }

    #[tokio::test]
    async fn test_memory_store_unavailable() {
        let mut store = MemoryStore::new();
        store.set_unavailable(true);

        assert!(matches!(store.get("a").await, Err(ProxyError::Backend(_))));
        assert!(matches!(store.ping().await, Err(ProxyError::Backend(_))));

        store.set_unavailable(false);
        assert!(store.ping().await.is_ok());
    }
}
