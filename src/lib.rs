//! Redis Proxy Cache - a read-through caching proxy for Redis
//!
//! Reads are served from a bounded local cache with LRU and TTL eviction,
//! falling back to the backing Redis on a miss. Writes go straight to Redis.

pub mod api;
pub mod backend;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod proxy;
pub mod tasks;

pub use api::AppState;
pub use backend::{BackingStore, MemoryStore, RedisStore};
pub use cache::EvictionCache;
pub use config::Config;
pub use error::{ProxyError, Result};
pub use proxy::RedisProxy;
pub use tasks::{spawn_proxy_worker, ProxyHandle};
