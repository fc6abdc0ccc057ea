//! Vigil - Entry Point
//!
//! Loads configuration, spawns the worker pool, and runs until a shutdown
//! signal arrives or the pool exits on its own (e.g. empty proxy set).

use std::sync::Arc;

use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod client;
mod config;
mod error;
mod identity;
mod pool;
mod worker;

use config::{Config, LogConfig};
use pool::WorkerPool;

#[tokio::main]
async fn main() -> error::Result<()> {
    let config = Config::from_env()?;
    init_tracing(&config.log);

    info!("Starting Vigil keep-alive engine");

    let config = Arc::new(config);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let pool_config = config.clone();
    let mut pool_task = tokio::spawn(async move {
        if let Err(e) = WorkerPool::run(pool_config, shutdown_rx).await {
            error!("Worker pool error: {}", e);
        }
    });

    tokio::select! {
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
            let _ = shutdown_tx.send(true);
            if let Err(e) = (&mut pool_task).await {
                error!("Worker pool task failed: {}", e);
            }
        }
        joined = &mut pool_task => {
            if let Err(e) = joined {
                error!("Worker pool task failed: {}", e);
            }
        }
    }

    info!("Vigil stopped");
    Ok(())
}

/// Initialize tracing with the configured level and output format
fn init_tracing(log: &LogConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("vigil={}", log.level)));

    let registry = tracing_subscriber::registry().with(filter);
    if log.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
