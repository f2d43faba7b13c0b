//! Request and Response models for the proxy HTTP API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{SetRequest, MAX_KEY_LENGTH, MAX_VALUE_SIZE};
pub use responses::{FlushResponse, GetResponse, HealthResponse, SetResponse, StatsResponse};
