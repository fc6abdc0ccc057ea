//! Wire types for the keep-alive and balance endpoints
//!
//! Field names mirror the remote API exactly; the structs exist so the rest
//! of the crate never touches raw JSON.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of the keep-alive POST, rebuilt on every heartbeat
#[derive(Debug, Clone, Serialize)]
pub struct HeartbeatPayload {
    /// Account identifier
    pub username: String,
    /// Simulated browser-extension id
    pub extensionid: String,
    /// Open tab count reported by the simulated client (always 0)
    pub numberoftabs: u32,
    /// Client version string
    #[serde(rename = "_v")]
    pub version: String,
    /// Stable per-proxy device identity
    pub browser_id: Uuid,
}

/// Response body of the keep-alive POST
///
/// Lenient on purpose: a 2xx body missing `success` counts as a rejection,
/// not a parse error.
#[derive(Debug, Clone, Deserialize)]
pub struct KeepAliveResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Response body of the balance GET
#[derive(Debug, Clone, Deserialize)]
pub struct BalanceResponse {
    #[serde(default)]
    pub status: bool,
    #[serde(default)]
    pub data: Option<BalanceData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BalanceData {
    #[serde(rename = "rewardPoint")]
    pub reward_point: Option<RewardPoint>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RewardPoint {
    pub points: f64,
    #[serde(rename = "userId")]
    pub user_id: String,
}

/// Balance extracted from a successful [`BalanceResponse`]
#[derive(Debug, Clone, PartialEq)]
pub struct Balance {
    pub points: f64,
    pub user_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::derive_identity;

    #[test]
    fn test_heartbeat_payload_wire_names() {
        let payload = HeartbeatPayload {
            username: "user-1".to_string(),
            extensionid: "ext-1".to_string(),
            numberoftabs: 0,
            version: "1.0.9".to_string(),
            browser_id: derive_identity(None),
        };

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["username"], "user-1");
        assert_eq!(value["numberoftabs"], 0);
        assert_eq!(value["_v"], "1.0.9");
        assert!(value["browser_id"].is_string());
    }

    #[test]
    fn test_keep_alive_response_missing_fields() {
        let resp: KeepAliveResponse = serde_json::from_str("{}").unwrap();
        assert!(!resp.success);
        assert!(resp.message.is_none());

        let resp: KeepAliveResponse =
            serde_json::from_str(r#"{"success": true, "message": "ok"}"#).unwrap();
        assert!(resp.success);
        assert_eq!(resp.message.as_deref(), Some("ok"));
    }

    #[test]
    fn test_balance_response_nested_shape() {
        let body = r#"{
            "status": true,
            "data": { "rewardPoint": { "points": 42, "userId": "u1" } }
        }"#;
        let resp: BalanceResponse = serde_json::from_str(body).unwrap();
        assert!(resp.status);
        let point = resp.data.unwrap().reward_point.unwrap();
        assert_eq!(point.points, 42.0);
        assert_eq!(point.user_id, "u1");
    }

    #[test]
    fn test_balance_response_tolerates_missing_data() {
        let resp: BalanceResponse =
            serde_json::from_str(r#"{"status": false}"#).unwrap();
        assert!(!resp.status);
        assert!(resp.data.is_none());
    }
}
