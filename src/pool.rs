//! Worker pool orchestration
//!
//! Builds the proxy entry set once at startup, spawns one session worker per
//! entry, and supervises them. Worker failures are isolated: a worker that
//! stops never cancels its siblings.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{error, info};

use crate::config::Config;
use crate::error::Result;
use crate::worker::SessionWorker;

/// Read the proxy list file, one trimmed non-empty line per entry.
/// A missing or unreadable file is logged and treated as empty.
pub fn load_proxies(path: &Path) -> Vec<String> {
    match std::fs::read_to_string(path) {
        Ok(contents) => contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect(),
        Err(e) => {
            error!("Proxy file {} not readable: {}", path.display(), e);
            Vec::new()
        }
    }
}

/// Compute the fixed entry set workers are spawned from: one `Some` per
/// proxy line, or a single `None` when proxy usage is off or unconfigured.
pub fn proxy_entries(config: &Config) -> Vec<Option<String>> {
    match &config.network.proxy_list {
        Some(path) if config.network.use_proxy => {
            load_proxies(path).into_iter().map(Some).collect()
        }
        _ => vec![None],
    }
}

/// Supervisor for the per-proxy session workers
pub struct WorkerPool;

impl WorkerPool {
    /// Spawn one worker per entry and wait for all of them. Under normal
    /// operation workers only stop on shutdown, so this blocks until the
    /// shutdown channel flips.
    pub async fn run(config: Arc<Config>, shutdown: watch::Receiver<bool>) -> Result<()> {
        let entries = proxy_entries(&config);
        if entries.is_empty() {
            error!("No proxies available");
            return Ok(());
        }

        info!("Spawning {} session workers", entries.len());

        let mut workers = JoinSet::new();
        for proxy in entries {
            let config = config.clone();
            let shutdown = shutdown.clone();
            let label = proxy.clone().unwrap_or_else(|| "Local".to_string());

            workers.spawn(async move {
                match SessionWorker::new(config, proxy) {
                    Ok(worker) => worker.run(shutdown).await,
                    Err(e) => error!(proxy = %label, "Worker setup failed: {}", e),
                }
                label
            });
        }

        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(label) => info!(proxy = %label, "Session worker stopped"),
                Err(e) => error!("Session worker task failed: {}", e),
            }
        }

        Ok(())
    }
}
