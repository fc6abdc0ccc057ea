//! Session worker: the per-proxy heartbeat loop
//!
//! One worker owns one [`Session`] for its whole lifetime and beats against
//! the keep-alive endpoint forever. Every per-iteration failure is absorbed
//! here; the loop only ends when the shutdown channel flips.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{interval, Interval, MissedTickBehavior};
use tracing::{error, info, warn};

use crate::client::models::{Balance, HeartbeatPayload};
use crate::client::session::{Session, CLIENT_VERSION, EXTENSION_ID};
use crate::config::Config;
use crate::error::{Result, VigilError};

/// Marker used in logs in place of a proxy for the direct-egress worker
const LOCAL_LABEL: &str = "Local";

/// Marker logged when the balance could not be retrieved
const UNKNOWN: &str = "unknown";

/// Outcome of one heartbeat iteration
#[derive(Debug)]
pub enum BeatOutcome {
    /// Server accepted the heartbeat; balance is `None` when the follow-up
    /// fetch failed (the beat still counts as confirmed).
    Confirmed {
        message: String,
        balance: Option<Balance>,
    },
    /// 2xx response with `success` false or missing
    Rejected { message: String },
    /// Transport-level failure; the balance endpoint was never contacted
    Failed(VigilError),
}

/// One independently scheduled unit running the heartbeat loop for exactly
/// one proxy (or the direct-egress case)
pub struct SessionWorker {
    session: Session,
    config: Arc<Config>,
    proxy: Option<String>,
}

impl SessionWorker {
    /// Build a worker and its session. A failure here is fatal to this
    /// worker only; siblings are unaffected.
    pub fn new(config: Arc<Config>, proxy: Option<String>) -> Result<Self> {
        let session = Session::new(&config, proxy.as_deref())?;
        Ok(Self {
            session,
            config,
            proxy,
        })
    }

    /// Proxy identifier used in every log line from this worker
    pub fn proxy_label(&self) -> &str {
        self.proxy.as_deref().unwrap_or(LOCAL_LABEL)
    }

    /// Run the heartbeat loop (call in a spawned task)
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(
            proxy = %self.proxy_label(),
            "Starting session worker ({}s interval)",
            self.config.network.heartbeat_interval
        );

        let mut beat_interval = beat_interval(self.config.network.heartbeat_interval());

        loop {
            tokio::select! {
                _ = beat_interval.tick() => {
                    let outcome = self.beat().await;
                    self.report(&outcome);
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!(proxy = %self.proxy_label(), "Session worker shutting down");
                        break;
                    }
                }
            }
        }
    }

    /// One iteration: heartbeat, then balance on confirmed heartbeats.
    /// The balance never races the next heartbeat; both run sequentially
    /// on this worker's session.
    pub async fn beat(&self) -> BeatOutcome {
        match self.session.send_keep_alive(&self.payload()).await {
            Ok(response) if response.success => {
                let balance = self.try_fetch_balance().await;
                BeatOutcome::Confirmed {
                    message: response.message.unwrap_or_else(|| "Success".to_string()),
                    balance,
                }
            }
            Ok(response) => BeatOutcome::Rejected {
                message: response.message.unwrap_or_else(|| "Error".to_string()),
            },
            Err(e) => BeatOutcome::Failed(e),
        }
    }

    /// Fresh payload per iteration; only the identity and account id matter
    /// and both are invariant for this worker.
    fn payload(&self) -> HeartbeatPayload {
        HeartbeatPayload {
            username: self.config.account.user_id.clone(),
            extensionid: EXTENSION_ID.to_string(),
            numberoftabs: 0,
            version: CLIENT_VERSION.to_string(),
            browser_id: self.session.identity(),
        }
    }

    /// Balance failures degrade the confirmed log line to `unknown` markers
    /// instead of failing the beat.
    async fn try_fetch_balance(&self) -> Option<Balance> {
        match self.session.fetch_balance().await {
            Ok(balance) => Some(balance),
            Err(e) if e.is_rejection() => {
                warn!(proxy = %self.proxy_label(), "Failed to retrieve balance: {}", e);
                None
            }
            Err(e) => {
                error!(proxy = %self.proxy_label(), "Error fetching balance: {}", e);
                None
            }
        }
    }

    /// Exactly one log line per beat
    fn report(&self, outcome: &BeatOutcome) {
        match outcome {
            BeatOutcome::Confirmed { message, balance } => {
                let points = balance
                    .as_ref()
                    .map(|b| b.points.to_string())
                    .unwrap_or_else(|| UNKNOWN.to_string());
                let user_id = balance
                    .as_ref()
                    .map(|b| b.user_id.as_str())
                    .unwrap_or(UNKNOWN);
                info!(
                    proxy = %self.proxy_label(),
                    points = %points,
                    user_id = %user_id,
                    "{}",
                    message
                );
            }
            BeatOutcome::Rejected { message } => {
                warn!(
                    proxy = %self.proxy_label(),
                    points = %UNKNOWN,
                    "Keep-alive rejected: {}",
                    message
                );
            }
            BeatOutcome::Failed(e) => {
                error!(proxy = %self.proxy_label(), "Keep-alive failed: {}", e);
            }
        }
    }
}

/// Interval holding the fixed heartbeat cadence. A beat can outlast the
/// period on a slow proxy; missed ticks wait out a full period instead of
/// firing back-to-back.
fn beat_interval(period: Duration) -> Interval {
    let mut beat_interval = interval(period);
    beat_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    beat_interval
}
