//! Overlay presenter: serializes feed effects into broadcast frames.

use feed_client::presenter::{Presenter, Severity};
use serde_json::json;
use tokio::sync::broadcast;

/// Fans feed effects out to overlay clients as JSON frames.
///
/// Sends never block; with no overlay attached the frame is dropped.
#[derive(Clone)]
pub struct BroadcastPresenter {
    overlay_tx: broadcast::Sender<String>,
}

impl BroadcastPresenter {
    pub fn new(overlay_tx: broadcast::Sender<String>) -> Self {
        Self { overlay_tx }
    }
}

impl Presenter for BroadcastPresenter {
    fn present_message(&self, text: &str, severity: Severity, sticky: bool) {
        tracing::info!(?severity, sticky, text, "feed message");
        let frame = json!({
            "type": "feed_message",
            "data": { "text": text, "severity": severity, "sticky": sticky },
        });
        let _ = self.overlay_tx.send(frame.to_string());
    }

    fn update_badge(&self, count: u64) {
        tracing::debug!(count, "badge update");
        let frame = json!({
            "type": "badge",
            "data": { "count": count },
        });
        let _ = self.overlay_tx.send(frame.to_string());
    }
}
