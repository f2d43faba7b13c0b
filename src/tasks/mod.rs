//! Background Tasks Module
//!
//! Contains the tasks that run for the lifetime of the proxy.
//!
//! # Tasks
//! - Proxy worker: executes proxy requests sequentially in submission order

mod worker;

pub use worker::{spawn_proxy_worker, PendingReply, ProxyHandle, Reply, Request};
