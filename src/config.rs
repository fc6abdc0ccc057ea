use crate::error::{Result, VigilError};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Remote API endpoints
    pub api: ApiConfig,
    /// Account credentials
    pub account: AccountConfig,
    /// Proxy and timing configuration
    pub network: NetworkConfig,
    /// Logging configuration
    pub log: LogConfig,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Keep-alive endpoint (POST)
    pub keep_alive_url: String,
    /// Balance endpoint (GET)
    pub balance_url: String,
}

#[derive(Debug, Clone)]
pub struct AccountConfig {
    /// Account identifier sent with every heartbeat
    pub user_id: String,
    /// Bearer token for the Authorization header
    pub token: String,
}

#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Fan out over the proxy list instead of the local egress (default: true)
    pub use_proxy: bool,
    /// Path to the proxy list file, one proxy URI per line
    pub proxy_list: Option<PathBuf>,
    /// Seconds between heartbeats (default: 120)
    pub heartbeat_interval: u64,
    /// Connection timeout in seconds
    pub connect_timeout: u64,
    /// Request timeout in seconds
    pub request_timeout: u64,
}

impl NetworkConfig {
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level (debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty)
    pub format: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            api: ApiConfig {
                keep_alive_url: require_url("VIGIL_KEEPALIVE_URL")?,
                balance_url: require_url("VIGIL_BALANCE_URL")?,
            },
            account: AccountConfig {
                user_id: require_env("VIGIL_USER_ID")?,
                token: require_env("VIGIL_TOKEN")?,
            },
            network: NetworkConfig {
                use_proxy: get_env_or("VIGIL_USE_PROXY", "true").parse().map_err(|_| {
                    VigilError::InvalidConfig("VIGIL_USE_PROXY must be true or false".into())
                })?,
                proxy_list: env::var("VIGIL_PROXY_LIST")
                    .ok()
                    .filter(|s| !s.trim().is_empty())
                    .map(PathBuf::from),
                heartbeat_interval: get_env_or("VIGIL_HEARTBEAT_INTERVAL", "120")
                    .parse()
                    .map_err(|_| {
                        VigilError::InvalidConfig(
                            "VIGIL_HEARTBEAT_INTERVAL must be a number of seconds".into(),
                        )
                    })?,
                connect_timeout: get_env_or("VIGIL_CONNECT_TIMEOUT", "10")
                    .parse()
                    .map_err(|_| {
                        VigilError::InvalidConfig(
                            "VIGIL_CONNECT_TIMEOUT must be a number of seconds".into(),
                        )
                    })?,
                request_timeout: get_env_or("VIGIL_REQUEST_TIMEOUT", "30")
                    .parse()
                    .map_err(|_| {
                        VigilError::InvalidConfig(
                            "VIGIL_REQUEST_TIMEOUT must be a number of seconds".into(),
                        )
                    })?,
            },
            log: LogConfig {
                level: get_env_or("LOG_LEVEL", "info"),
                format: get_env_or("LOG_FORMAT", "pretty"),
            },
        })
    }
}

/// Get environment variable with a default value
fn get_env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get a required environment variable
fn require_env(key: &str) -> Result<String> {
    match env::var(key) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(VigilError::MissingEnvVar(key.to_string())),
    }
}

/// Get a required environment variable and validate it parses as a URL
fn require_url(key: &str) -> Result<String> {
    let raw = require_env(key)?;
    Url::parse(&raw)
        .map_err(|e| VigilError::InvalidConfig(format!("{} must be a valid URL: {}", key, e)))?;
    Ok(raw)
}
