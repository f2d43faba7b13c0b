//! Redis Backing Store
//!
//! Thin passthrough to a Redis server using the `redis` crate's multiplexed
//! tokio connection.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client, ConnectionAddr, ConnectionInfo, RedisConnectionInfo};
use tracing::info;

use crate::backend::BackingStore;
use crate::error::Result;

// == Redis Store ==
/// Backing store talking to a single Redis server.
#[derive(Clone)]
pub struct RedisStore {
    conn: MultiplexedConnection,
}

impl RedisStore {
    // == Connect ==
    /// Opens a connection to `host:port`, authenticating when `password` is set.
    ///
    /// # Errors
    /// `ProxyError::Store` if the server is unreachable or rejects the credentials.
    pub async fn connect(host: &str, port: u16, password: Option<String>) -> Result<Self> {
        let info = ConnectionInfo {
            addr: ConnectionAddr::Tcp(host.to_string(), port),
            redis: RedisConnectionInfo {
                db: 0,
                username: None,
                password,
            },
        };
        let client = Client::open(info)?;
        let conn = client.get_multiplexed_async_connection().await?;
        info!("Connected to backing Redis at {}:{}", host, port);

        Ok(Self { conn })
    }
}

#[async_trait]
impl BackingStore for RedisStore {
    async fn get(&mut self, key: &str) -> Result<Option<String>> {
        let value: Option<String> = self.conn.get(key).await?;
        Ok(value)
    }

    async fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let _: () = self.conn.set(key, value).await?;
        Ok(())
    }

    async fn ping(&mut self) -> Result<String> {
        let reply: String = redis::cmd("PING").query_async(&mut self.conn).await?;
        Ok(reply)
    }

    async fn flush_all(&mut self) -> Result<String> {
        let reply: String = redis::cmd("FLUSHDB").query_async(&mut self.conn).await?;
        Ok(reply)
    }
}
