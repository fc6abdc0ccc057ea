//! HTTP client layer: wire types and the per-worker session

pub mod models;
pub mod session;

pub use models::{Balance, HeartbeatPayload, KeepAliveResponse};
pub use session::Session;
