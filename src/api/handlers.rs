//! API Handlers
//!
//! HTTP request handlers for each proxy endpoint. Every handler goes through
//! the proxy worker, so requests are served one at a time in arrival order.

use std::time::Duration;

use axum::{
    extract::{Path, State},
    Json,
};
use tokio::task::JoinHandle;

use crate::backend::BackingStore;
use crate::error::{ProxyError, Result};
use crate::models::{
    FlushResponse, GetResponse, HealthResponse, SetRequest, SetResponse, StatsResponse,
};
use crate::proxy::RedisProxy;
use crate::tasks::{spawn_proxy_worker, ProxyHandle};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Submitter for the proxy worker
    pub proxy: ProxyHandle,
    /// Configured cache capacity, reported by /stats
    pub capacity: usize,
    /// Configured cache expiry, reported by /stats
    pub ttl: Duration,
}

impl AppState {
    /// Creates a new AppState around a running proxy worker.
    pub fn new(proxy: ProxyHandle, capacity: usize, ttl: Duration) -> Self {
        Self {
            proxy,
            capacity,
            ttl,
        }
    }

    /// Starts the worker for `proxy` and builds state around its handle.
    ///
    /// Returns the worker task, which finishes once every clone of the state
    /// has been dropped.
    pub fn spawn<S>(proxy: RedisProxy<S>) -> (Self, JoinHandle<()>)
    where
        S: BackingStore + 'static,
    {
        let capacity = proxy.cache().capacity();
        let ttl = proxy.cache().ttl();
        let (handle, task) = spawn_proxy_worker(proxy);
        (Self::new(handle, capacity, ttl), task)
    }
}

/// Handler for GET /get/:key
///
/// Reads a key, serving it from the cache when fresh.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    match state.proxy.get(key.clone()).await? {
        Some(value) => Ok(Json(GetResponse::new(key, value))),
        None => Err(ProxyError::NotFound(key)),
    }
}

/// Handler for PUT /set
///
/// Writes a key-value pair to the backing store.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(ProxyError::InvalidArgument(error_msg));
    }

    state.proxy.set(req.key.clone(), req.value).await?;

    Ok(Json(SetResponse::new(req.key)))
}

/// Handler for GET /stats
///
/// Returns current cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let stats = state.proxy.cache_stats().await?;

    Ok(Json(StatsResponse::new(
        &stats,
        state.capacity,
        state.ttl.as_millis() as u64,
    )))
}

/// Handler for GET /health
///
/// Healthy when the backing store answers a ping.
pub async fn health_handler(State(state): State<AppState>) -> Result<Json<HealthResponse>> {
    let pong = state.proxy.ping().await?;
    Ok(Json(HealthResponse::healthy(pong)))
}

/// Handler for POST /flush
///
/// Deletes every key in the backing store.
pub async fn flush_handler(State(state): State<AppState>) -> Result<Json<FlushResponse>> {
    let reply = state.proxy.flush_db().await?;
    Ok(Json(FlushResponse::new(reply)))
}
