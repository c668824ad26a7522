//! WebSocket bus client for server-pushed notification batches.
//!
//! Connects to the back office's websocket bus, subscribes to one
//! notification channel, and manages automatic reconnection with
//! exponential backoff. Frames are decoded into ordered batches and
//! delivered without reordering or deduplication.

mod connection;
#[cfg(test)]
mod tests;

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};

use crate::FeedError;
use crate::subscription::SubscriptionState;

const SILENCE_TIMEOUT: Duration = Duration::from_secs(60);
const BASE_BACKOFF: Duration = Duration::from_secs(2);
const MAX_BACKOFF: Duration = Duration::from_secs(60);
const FAILURE_RESET_WINDOW: Duration = Duration::from_secs(5 * 60);
const BATCH_CHANNEL_CAPACITY: usize = 256;

/// One raw record as pushed by the server.
///
/// Both fields are optional on purpose: a record missing either is
/// malformed and gets skipped by the dispatcher, not the decoder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "type", default)]
    pub record_type: Option<String>,
    #[serde(default)]
    pub payload: Option<serde_json::Value>,
}

/// An ordered group of records delivered in one frame.
pub type Batch = Vec<RawRecord>;

/// Bus client configuration.
#[derive(Debug, Clone)]
pub struct BusConfig {
    pub server_url: String,
    pub channel: String,
}

/// Bus WebSocket client with auto-reconnect.
///
/// Batches are delivered via `mpsc::Receiver<Batch>`.
pub struct BusClient;

impl BusClient {
    /// Start the bus loop. Returns a batch receiver and shutdown sender.
    pub(crate) async fn connect(
        config: BusConfig,
        state_tx: watch::Sender<SubscriptionState>,
    ) -> Result<(mpsc::Receiver<Batch>, mpsc::Sender<()>), FeedError> {
        url::Url::parse(&config.server_url)?;
        let (batch_tx, batch_rx) = mpsc::channel::<Batch>(BATCH_CHANNEL_CAPACITY);
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);
        tokio::spawn(Self::run_loop(config, batch_tx, shutdown_rx, state_tx));
        Ok((batch_rx, shutdown_tx))
    }

    async fn run_loop(
        config: BusConfig,
        batch_tx: mpsc::Sender<Batch>,
        mut shutdown_rx: mpsc::Receiver<()>,
        state_tx: watch::Sender<SubscriptionState>,
    ) {
        let mut failures: u32 = 0;
        let mut last_failure_at: Option<Instant> = None;
        let mut cursor: u64 = 0;
        loop {
            if shutdown_rx.try_recv().is_ok() {
                tracing::info!("bus shutdown requested");
                let _ = state_tx.send(SubscriptionState::Closed);
                return;
            }
            if let Some(last_failure) = last_failure_at {
                if last_failure.elapsed() >= FAILURE_RESET_WINDOW {
                    if failures > 0 {
                        tracing::info!(failures, "bus failures reset after stable interval");
                    }
                    failures = 0;
                    last_failure_at = None;
                }
            }
            let _ = state_tx.send(SubscriptionState::Connecting);
            match Self::connect_once(&config, &mut cursor, &batch_tx, &mut shutdown_rx, &state_tx)
                .await
            {
                Ok(()) => {
                    tracing::info!("bus connection closed cleanly");
                    let _ = state_tx.send(SubscriptionState::Closed);
                    return;
                }
                Err(e) => {
                    let _ = state_tx.send(SubscriptionState::Disconnected);
                    failures += 1;
                    last_failure_at = Some(Instant::now());
                    let backoff = Self::backoff_duration(failures);
                    tracing::warn!(
                        error = %e, attempt = failures,
                        backoff_secs = backoff.as_secs(),
                        "bus connection failed, will reconnect"
                    );
                    tokio::select! {
                        _ = shutdown_rx.recv() => {
                            tracing::info!("bus shutdown requested during reconnect backoff");
                            let _ = state_tx.send(SubscriptionState::Closed);
                            return;
                        }
                        _ = tokio::time::sleep(backoff) => {}
                    }
                }
            }
        }
    }

    fn backoff_duration(failures: u32) -> Duration {
        let d = BASE_BACKOFF * 2u32.saturating_pow(failures.saturating_sub(1));
        d.min(MAX_BACKOFF)
    }
}
