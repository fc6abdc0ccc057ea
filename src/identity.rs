//! Deterministic per-proxy device identity
//!
//! The remote service associates each identity with a simulated device, so the
//! value must be stable across restarts: the same proxy always maps to the
//! same identity. UUIDv5 over the DNS namespace gives exactly that.

use uuid::Uuid;

/// Name hashed in place of a proxy when running over the local egress.
const LOCAL_SENTINEL: &str = "local_network";

/// Derive the stable pseudo-device identity for a proxy endpoint, or for the
/// local egress when no proxy is bound.
pub fn derive_identity(proxy: Option<&str>) -> Uuid {
    let name = proxy.unwrap_or(LOCAL_SENTINEL);
    Uuid::new_v5(&Uuid::NAMESPACE_DNS, name.as_bytes())
}
