//! Error types for the proxy
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Proxy Error Enum ==
/// Unified error type for the proxy and its HTTP surface.
///
/// Absence of a key is not an error in the library API (`Ok(None)`);
/// `NotFound` only exists for the HTTP layer.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// Invalid construction argument or request data
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Key not found in cache or backing store
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Redis backing store failure, passed through unchanged
    #[error("Backing store error: {0}")]
    Store(#[from] redis::RedisError),

    /// Failure reported by a non-redis backing store
    #[error("Backing store error: {0}")]
    Backend(String),

    /// The request worker stopped before answering
    #[error("Proxy worker unavailable")]
    WorkerUnavailable,

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = match &self {
            ProxyError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            ProxyError::NotFound(_) => StatusCode::NOT_FOUND,
            ProxyError::Store(_) | ProxyError::Backend(_) => StatusCode::BAD_GATEWAY,
            ProxyError::WorkerUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ProxyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the proxy.
pub type Result<T> = std::result::Result<T, ProxyError>;
