//! Redis Proxy Cache - a read-through caching proxy for Redis
//!
//! Serves the proxy over HTTP; all requests run through one sequential worker.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use redis_proxy_cache::{api::create_router, AppState, Config, RedisProxy, RedisStore};

/// Main entry point for the proxy server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load and validate configuration from environment variables
/// 3. Connect to the backing Redis
/// 4. Start the proxy worker owning the cache
/// 5. Serve the HTTP API until SIGINT/SIGTERM
/// 6. Wait for the worker to drain
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "redis_proxy_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Redis Proxy Cache");

    let config = Config::from_env();
    config.validate().context("invalid configuration")?;
    info!(
        "Configuration loaded: redis={}:{}, capacity={}, ttl={}ms, port={}",
        config.redis_host,
        config.redis_port,
        config.cache_capacity,
        config.cache_ttl_ms,
        config.server_port
    );

    let store = RedisStore::connect(
        &config.redis_host,
        config.redis_port,
        config.redis_password.clone(),
    )
    .await
    .context("failed to connect to backing Redis")?;

    let proxy = RedisProxy::new(store, config.cache_capacity, config.cache_ttl_ms)?;
    let (state, worker) = AppState::spawn(proxy);

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    // The router and its handles are gone; the worker exits once drained
    worker.await.context("proxy worker panicked")?;
    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
