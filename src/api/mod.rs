//! API Module
//!
//! HTTP handlers and routing for the proxy REST API.
//!
//! # Endpoints
//! - `GET /get/:key` - Read a key through the cache
//! - `PUT /set` - Write a key to the backing store
//! - `GET /health` - Ping the backing store
//! - `GET /stats` - Get cache statistics
//! - `POST /flush` - Flush the backing store

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
