//! Vigil - Proxy-Parallel Keep-Alive Engine
//!
//! Maintains continuous liveness with a remote rewards API on behalf of one
//! account, fanned out across many egress proxies.
//!
//! ## Features
//!
//! - One independent heartbeat session per configured proxy (or a single
//!   local session when none are configured)
//! - Deterministic per-proxy device identities (UUIDv5)
//! - Balance retrieval piggybacked on confirmed heartbeats
//! - Isolated failure domains: a failing worker never affects its siblings
//! - Graceful shutdown via Ctrl-C / SIGTERM

pub mod client;
pub mod config;
pub mod error;
pub mod identity;
pub mod pool;
pub mod worker;

pub use config::Config;
pub use error::{Result, VigilError};
pub use pool::WorkerPool;
pub use worker::SessionWorker;
