//! API Routes
//!
//! Configures the Axum router with all proxy endpoints.

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    flush_handler, get_handler, health_handler, set_handler, stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /get/:key` - Read a key through the cache
/// - `PUT /set` - Write a key to the backing store
/// - `GET /health` - Ping the backing store
/// - `GET /stats` - Get cache statistics
/// - `POST /flush` - Flush the backing store
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/get/:key", get(get_handler))
        .route("/set", put(set_handler))
        .route("/health", get(health_handler))
        .route("/stats", get(stats_handler))
        .route("/flush", post(flush_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
