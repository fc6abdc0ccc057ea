//! Per-worker HTTP session
//!
//! One session per worker, bound to that worker's proxy (or the local egress)
//! for its entire lifetime. Sessions are never shared between workers.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, AUTHORIZATION, CONTENT_TYPE, ORIGIN, USER_AGENT};
use reqwest::{Client, Proxy};
use uuid::Uuid;

use crate::client::models::{Balance, BalanceResponse, HeartbeatPayload, KeepAliveResponse};
use crate::config::Config;
use crate::error::{Result, VigilError};
use crate::identity::derive_identity;

/// Extension id the simulated client reports in its origin and payload
pub const EXTENSION_ID: &str = "fpdkjdnhkakefebpekbdhillbhonfjjp";

/// Client version reported in the heartbeat payload
pub const CLIENT_VERSION: &str = "1.0.9";

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 10; K) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0.0.0 Mobile Safari/537.36";

/// One logical HTTP client context bound to a single egress path
#[derive(Debug)]
pub struct Session {
    client: Client,
    keep_alive_url: String,
    balance_url: String,
    identity: Uuid,
}

impl Session {
    /// Build a session, binding `proxy` when present.
    ///
    /// TLS peer verification is disabled on purpose: the remote endpoint's
    /// certificate chain is not validated, and behavior-compatible clients
    /// must keep it that way.
    pub fn new(config: &Config, proxy: Option<&str>) -> Result<Self> {
        let mut builder = Client::builder()
            .default_headers(default_headers(&config.account.token)?)
            .danger_accept_invalid_certs(true)
            .connect_timeout(config.network.connect_timeout())
            .timeout(config.network.request_timeout());

        if let Some(proxy) = proxy {
            let proxy = Proxy::all(proxy)
                .map_err(|e| VigilError::InvalidProxyAddress(format!("{}: {}", proxy, e)))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| VigilError::SessionSetup(e.to_string()))?;

        Ok(Self {
            client,
            keep_alive_url: config.api.keep_alive_url.clone(),
            balance_url: config.api.balance_url.clone(),
            identity: derive_identity(proxy),
        })
    }

    /// Identity this session presents to the remote service
    pub fn identity(&self) -> Uuid {
        self.identity
    }

    /// POST one heartbeat. Non-2xx and unparsable bodies are errors; the
    /// application-level `success` flag is left for the caller to interpret.
    pub async fn send_keep_alive(&self, payload: &HeartbeatPayload) -> Result<KeepAliveResponse> {
        let response = self
            .client
            .post(&self.keep_alive_url)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(VigilError::BadStatus {
                status: status.as_u16(),
            });
        }

        response
            .json::<KeepAliveResponse>()
            .await
            .map_err(|e| VigilError::MalformedResponse(e.to_string()))
    }

    /// GET the account balance over this session.
    ///
    /// `status: false` comes back as [`VigilError::Rejected`], a missing
    /// `data.rewardPoint` as [`VigilError::MalformedResponse`]; neither is
    /// retried here.
    pub async fn fetch_balance(&self) -> Result<Balance> {
        let response = self.client.get(&self.balance_url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(VigilError::BadStatus {
                status: status.as_u16(),
            });
        }

        let body = response
            .json::<BalanceResponse>()
            .await
            .map_err(|e| VigilError::MalformedResponse(e.to_string()))?;

        if !body.status {
            return Err(VigilError::Rejected {
                message: "balance status is false".to_string(),
            });
        }

        let point = body
            .data
            .and_then(|d| d.reward_point)
            .ok_or_else(|| VigilError::MalformedResponse("missing data.rewardPoint".to_string()))?;

        Ok(Balance {
            points: point.points,
            user_id: point.user_id,
        })
    }
}

/// Header set shared by every request of a session
fn default_headers(token: &str) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();

    let mut auth = HeaderValue::from_str(&format!("Bearer {}", token))
        .map_err(|_| VigilError::InvalidConfig("token contains invalid header bytes".into()))?;
    auth.set_sensitive(true);
    headers.insert(AUTHORIZATION, auth);

    let origin = HeaderValue::from_str(&format!("chrome-extension://{}", EXTENSION_ID))
        .map_err(|e| VigilError::SessionSetup(e.to_string()))?;
    headers.insert(ORIGIN, origin);

    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert("sec-fetch-dest", HeaderValue::from_static("empty"));
    headers.insert("sec-fetch-mode", HeaderValue::from_static("cors"));
    headers.insert("sec-fetch-site", HeaderValue::from_static("cross-site"));

    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httptest::{matchers::*, responders::*, Expectation, Server};

    fn test_config(server: &Server) -> Config {
        use crate::config::{AccountConfig, ApiConfig, LogConfig, NetworkConfig};

        Config {
            api: ApiConfig {
                keep_alive_url: server.url("/keepalive").to_string(),
                balance_url: server.url("/getpoint").to_string(),
            },
            account: AccountConfig {
                user_id: "user-1".to_string(),
                token: "secret-token".to_string(),
            },
            network: NetworkConfig {
                use_proxy: false,
                proxy_list: None,
                heartbeat_interval: 120,
                connect_timeout: 2,
                request_timeout: 2,
            },
            log: LogConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }

    fn test_payload(session: &Session) -> HeartbeatPayload {
        HeartbeatPayload {
            username: "user-1".to_string(),
            extensionid: EXTENSION_ID.to_string(),
            numberoftabs: 0,
            version: CLIENT_VERSION.to_string(),
            browser_id: session.identity(),
        }
    }

    #[tokio::test]
    async fn test_keep_alive_sends_auth_and_parses_body() -> anyhow::Result<()> {
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method_path("POST", "/keepalive"),
                request::headers(contains(("authorization", "Bearer secret-token"))),
            ])
            .respond_with(json_encoded(serde_json::json!({
                "success": true,
                "message": "ok"
            }))),
        );

        let config = test_config(&server);
        let session = Session::new(&config, None)?;
        let response = session.send_keep_alive(&test_payload(&session)).await?;

        assert!(response.success);
        assert_eq!(response.message.as_deref(), Some("ok"));
        Ok(())
    }

    #[tokio::test]
    async fn test_keep_alive_non_2xx_is_bad_status() -> anyhow::Result<()> {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("POST", "/keepalive"))
                .respond_with(status_code(503)),
        );

        let config = test_config(&server);
        let session = Session::new(&config, None)?;
        let err = session
            .send_keep_alive(&test_payload(&session))
            .await
            .unwrap_err();

        assert!(matches!(err, VigilError::BadStatus { status: 503 }));
        Ok(())
    }

    #[tokio::test]
    async fn test_keep_alive_garbage_body_is_malformed() -> anyhow::Result<()> {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("POST", "/keepalive"))
                .respond_with(status_code(200).body("not json")),
        );

        let config = test_config(&server);
        let session = Session::new(&config, None)?;
        let err = session
            .send_keep_alive(&test_payload(&session))
            .await
            .unwrap_err();

        assert!(matches!(err, VigilError::MalformedResponse(_)));
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_balance_extracts_nested_fields() -> anyhow::Result<()> {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/getpoint")).respond_with(
                json_encoded(serde_json::json!({
                    "status": true,
                    "data": { "rewardPoint": { "points": 42.0, "userId": "u1" } }
                })),
            ),
        );

        let config = test_config(&server);
        let session = Session::new(&config, None)?;
        let balance = session.fetch_balance().await?;

        assert_eq!(
            balance,
            Balance {
                points: 42.0,
                user_id: "u1".to_string()
            }
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_balance_status_false_is_rejection() -> anyhow::Result<()> {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/getpoint"))
                .respond_with(json_encoded(serde_json::json!({ "status": false }))),
        );

        let config = test_config(&server);
        let session = Session::new(&config, None)?;
        let err = session.fetch_balance().await.unwrap_err();

        assert!(err.is_rejection());
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_balance_missing_reward_point_is_malformed() -> anyhow::Result<()> {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/getpoint"))
                .respond_with(json_encoded(serde_json::json!({ "status": true, "data": {} }))),
        );

        let config = test_config(&server);
        let session = Session::new(&config, None)?;
        let err = session.fetch_balance().await.unwrap_err();

        assert!(matches!(err, VigilError::MalformedResponse(_)));
        Ok(())
    }

    #[test]
    fn test_malformed_proxy_is_invalid_address() {
        let server = Server::run();
        let config = test_config(&server);

        let err = Session::new(&config, Some("http://invalid host/")).unwrap_err();
        assert!(matches!(err, VigilError::InvalidProxyAddress(_)));
    }
}
