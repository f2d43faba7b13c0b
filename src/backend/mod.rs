//! Backing Store Module
//!
//! The key-value store sitting behind the cache.
//!
//! # Implementations
//! - [`RedisStore`]: a Redis server over a multiplexed async connection
//! - [`MemoryStore`]: an in-process map, used in tests and local runs

mod memory;
mod redis_store;

use async_trait::async_trait;

use crate::error::Result;

pub use memory::MemoryStore;
pub use redis_store::RedisStore;

/// Client of the backing key-value store.
///
/// Calls are issued one at a time by the proxy worker, so implementations
/// take `&mut self` and need no internal locking of their own. Failures are
/// returned to the caller untouched; the proxy never retries.
#[async_trait]
pub trait BackingStore: Send {
    /// Looks up `key`; `Ok(None)` when the store has no value for it.
    async fn get(&mut self, key: &str) -> Result<Option<String>>;

    /// Writes `value` under `key`.
    async fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Liveness check, "PONG" when healthy.
    async fn ping(&mut self) -> Result<String>;

    /// Deletes every key in the store's current database.
    async fn flush_all(&mut self) -> Result<String>;
}
