//! Proxy Worker Task
//!
//! Owns a [`RedisProxy`] on a single tokio task and executes submitted
//! requests one at a time, in submission order. Callers hold cheap, cloneable
//! [`ProxyHandle`]s and may submit concurrently.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::backend::BackingStore;
use crate::cache::CacheStats;
use crate::error::{ProxyError, Result};
use crate::proxy::RedisProxy;

// == Requests ==
/// A single operation against the proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Get { key: String },
    Set { key: String, value: String },
    Ping,
    FlushDb,
    CacheSize,
    ContainsValidEntry { key: String },
    Stats,
}

/// Outcome of a successful [`Request`].
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Value(Option<String>),
    Stored,
    Pong(String),
    Flushed(String),
    Size(usize),
    Valid(bool),
    Stats(CacheStats),
}

enum Message {
    Batch {
        requests: Vec<Request>,
        reply: oneshot::Sender<Vec<Result<Reply>>>,
    },
    Shutdown,
}

// == Spawn ==
/// Moves `proxy` onto a dedicated task and returns a handle for submitting
/// requests.
///
/// The task exits once every handle has been dropped, or after
/// [`ProxyHandle::shutdown`] once the batches queued ahead of it have run.
///
/// # Example
/// ```ignore
/// let proxy = RedisProxy::new(MemoryStore::new(), 100, 10_000)?;
/// let (handle, worker) = spawn_proxy_worker(proxy);
/// handle.set("a", "1").await?;
/// drop(handle);
/// worker.await?;
/// ```
pub fn spawn_proxy_worker<S>(mut proxy: RedisProxy<S>) -> (ProxyHandle, JoinHandle<()>)
where
    S: BackingStore + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();

    let task = tokio::spawn(async move {
        info!("Proxy worker started");

        while let Some(message) = rx.recv().await {
            let (requests, reply) = match message {
                Message::Batch { requests, reply } => (requests, reply),
                Message::Shutdown => {
                    info!("Proxy worker shutdown requested");
                    break;
                }
            };
            let mut replies = Vec::with_capacity(requests.len());
            for request in requests {
                let result = execute(&mut proxy, request).await;
                if let Err(err) = &result {
                    warn!(error = %err, "Proxy request failed");
                }
                replies.push(result);
            }
            // The submitter may have stopped waiting
            let _ = reply.send(replies);
        }

        info!("Proxy worker stopped");
    });

    (ProxyHandle { tx }, task)
}

async fn execute<S: BackingStore>(proxy: &mut RedisProxy<S>, request: Request) -> Result<Reply> {
    match request {
        Request::Get { key } => proxy.get(&key).await.map(Reply::Value),
        Request::Set { key, value } => proxy.set(&key, &value).await.map(|_| Reply::Stored),
        Request::Ping => proxy.ping().await.map(Reply::Pong),
        Request::FlushDb => proxy.flush_db().await.map(Reply::Flushed),
        Request::CacheSize => Ok(Reply::Size(proxy.cache_size())),
        Request::ContainsValidEntry { key } => {
            Ok(Reply::Valid(proxy.cache_contains_valid_entry(&key)))
        }
        Request::Stats => Ok(Reply::Stats(proxy.cache_stats())),
    }
}

// == Pending Reply ==
/// Replies of an enqueued batch, resolved once the worker has run it.
pub struct PendingReply {
    rx: oneshot::Receiver<Vec<Result<Reply>>>,
}

impl PendingReply {
    /// Waits for the batch to finish; one result per request, in order.
    pub async fn wait(self) -> Result<Vec<Result<Reply>>> {
        self.rx.await.map_err(|_| ProxyError::WorkerUnavailable)
    }
}

// == Proxy Handle ==
/// Cloneable submitter for a proxy worker.
#[derive(Clone)]
pub struct ProxyHandle {
    tx: mpsc::UnboundedSender<Message>,
}

impl ProxyHandle {
    // == Enqueue ==
    /// Queues `requests` as one batch without waiting.
    ///
    /// The batch runs after every batch enqueued before it, and no other
    /// batch is interleaved with it. A failing request does not stop the
    /// rest of the batch.
    pub fn enqueue(&self, requests: Vec<Request>) -> Result<PendingReply> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Message::Batch { requests, reply })
            .map_err(|_| ProxyError::WorkerUnavailable)?;
        Ok(PendingReply { rx })
    }

    /// Queues a batch and waits for its replies.
    pub async fn submit(&self, requests: Vec<Request>) -> Result<Vec<Result<Reply>>> {
        self.enqueue(requests)?.wait().await
    }

    async fn call(&self, request: Request) -> Result<Reply> {
        self.submit(vec![request])
            .await?
            .pop()
            .ok_or_else(|| ProxyError::Internal("worker returned no reply".to_string()))?
    }

    pub async fn get(&self, key: impl Into<String>) -> Result<Option<String>> {
        match self.call(Request::Get { key: key.into() }).await? {
            Reply::Value(value) => Ok(value),
            other => Err(unexpected(other)),
        }
    }

    pub async fn set(&self, key: impl Into<String>, value: impl Into<String>) -> Result<()> {
        let request = Request::Set {
            key: key.into(),
            value: value.into(),
        };
        match self.call(request).await? {
            Reply::Stored => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    pub async fn ping(&self) -> Result<String> {
        match self.call(Request::Ping).await? {
            Reply::Pong(reply) => Ok(reply),
            other => Err(unexpected(other)),
        }
    }

    pub async fn flush_db(&self) -> Result<String> {
        match self.call(Request::FlushDb).await? {
            Reply::Flushed(reply) => Ok(reply),
            other => Err(unexpected(other)),
        }
    }

    pub async fn cache_size(&self) -> Result<usize> {
        match self.call(Request::CacheSize).await? {
            Reply::Size(size) => Ok(size),
            other => Err(unexpected(other)),
        }
    }

    pub async fn cache_contains_valid_entry(&self, key: impl Into<String>) -> Result<bool> {
        match self.call(Request::ContainsValidEntry { key: key.into() }).await? {
            Reply::Valid(valid) => Ok(valid),
            other => Err(unexpected(other)),
        }
    }

    pub async fn cache_stats(&self) -> Result<CacheStats> {
        match self.call(Request::Stats).await? {
            Reply::Stats(stats) => Ok(stats),
            other => Err(unexpected(other)),
        }
    }

    // == Shutdown ==
    /// Asks the worker to stop after the batches already queued.
    ///
    /// Batches queued after this call are dropped unanswered, and every
    /// handle reports `ProxyError::WorkerUnavailable` once the worker exits.
    pub fn shutdown(&self) -> Result<()> {
        self.tx
            .send(Message::Shutdown)
            .map_err(|_| ProxyError::WorkerUnavailable)
    }

    /// True once the worker task has exited.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

fn unexpected(reply: Reply) -> ProxyError {
    ProxyError::Internal(format!("unexpected worker reply: {:?}", reply))
}
