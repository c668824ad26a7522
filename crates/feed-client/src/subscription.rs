//! Subscription lifecycle: channel derivation, state machine, handles.

use tokio::sync::{mpsc, watch};

use crate::FeedError;
use crate::bus::{Batch, BusClient, BusConfig};

/// Derive the per-user notification channel from a partner id.
///
/// Kept as a standalone function so the identity-to-channel mapping is
/// testable apart from any connection setup.
pub fn partner_channel(partner_id: i64) -> String {
    format!("payment_notification_{partner_id}")
}

/// Lifecycle of one bus subscription.
///
/// `Closed` is terminal and only reached via [`Subscription::close`] or
/// [`FeedClient::close`]; connection loss goes back to `Disconnected` and
/// the bus client reconnects on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
    Disconnected,
    Connecting,
    Connected,
    Closed,
}

/// Handle to one logical subscription.
///
/// The channel id never changes for the lifetime of the handle; switching
/// users means closing this subscription and opening a new one.
pub struct Subscription {
    channel_id: String,
    state_rx: watch::Receiver<SubscriptionState>,
    shutdown_tx: mpsc::Sender<()>,
}

impl Subscription {
    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    pub fn state(&self) -> SubscriptionState {
        *self.state_rx.borrow()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == SubscriptionState::Connected
    }

    pub fn is_closed(&self) -> bool {
        self.state() == SubscriptionState::Closed
    }

    /// Observe state transitions.
    pub fn watch_state(&self) -> watch::Receiver<SubscriptionState> {
        self.state_rx.clone()
    }

    /// Request teardown. Safe to call any number of times, from any task,
    /// including a handler fed by this very subscription: the signal send
    /// never blocks.
    pub fn close(&self) {
        let _ = self.shutdown_tx.try_send(());
    }
}

/// Feed client owning at most one live subscription.
pub struct FeedClient {
    server_url: String,
    active: Option<Subscription>,
}

impl FeedClient {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            active: None,
        }
    }

    /// Open a subscription to `channel_id`.
    ///
    /// Re-opening the channel that is already live is a no-op and returns
    /// `None`. Opening a different channel tears the old subscription down
    /// first. A fresh subscription returns its batch receiver.
    pub async fn open(
        &mut self,
        channel_id: &str,
    ) -> Result<Option<mpsc::Receiver<Batch>>, FeedError> {
        if channel_id.is_empty() {
            return Err(FeedError::EmptyChannel);
        }
        if let Some(sub) = &self.active {
            if sub.channel_id() == channel_id && !sub.is_closed() {
                tracing::debug!(channel_id, "subscription already open");
                return Ok(None);
            }
        }
        self.close();

        let (state_tx, state_rx) = watch::channel(SubscriptionState::Disconnected);
        let config = BusConfig {
            server_url: self.server_url.clone(),
            channel: channel_id.to_string(),
        };
        let (batch_rx, shutdown_tx) = BusClient::connect(config, state_tx).await?;
        self.active = Some(Subscription {
            channel_id: channel_id.to_string(),
            state_rx,
            shutdown_tx,
        });
        Ok(Some(batch_rx))
    }

    /// Close the active subscription, if any. Idempotent.
    pub fn close(&mut self) {
        if let Some(sub) = self.active.take() {
            sub.close();
        }
    }

    pub fn subscription(&self) -> Option<&Subscription> {
        self.active.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Port 9 is never listening; connection attempts fail in the
    // background while the handles behave normally.
    const TEST_URL: &str = "ws://127.0.0.1:9/websocket";

    #[test]
    fn partner_channel_is_deterministic() {
        assert_eq!(partner_channel(7), "payment_notification_7");
        assert_eq!(partner_channel(7), partner_channel(7));
    }

    #[tokio::test]
    async fn open_rejects_empty_channel() {
        let mut client = FeedClient::new(TEST_URL);
        let err = client.open("").await.unwrap_err();
        assert!(matches!(err, FeedError::EmptyChannel));
    }

    #[tokio::test]
    async fn open_rejects_invalid_url() {
        let mut client = FeedClient::new("not a url");
        assert!(client.open("payment_notification_1").await.is_err());
    }

    #[tokio::test]
    async fn reopen_same_channel_is_noop() {
        let mut client = FeedClient::new(TEST_URL);
        assert!(client.open("payment_notification_1").await.unwrap().is_some());
        assert!(client.open("payment_notification_1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn switching_channels_replaces_the_subscription() {
        let mut client = FeedClient::new(TEST_URL);
        client.open("payment_notification_1").await.unwrap();
        let replaced = client.open("payment_notification_2").await.unwrap();
        assert!(replaced.is_some());
        assert_eq!(
            client.subscription().unwrap().channel_id(),
            "payment_notification_2"
        );
    }

    #[tokio::test]
    async fn subscription_close_is_idempotent() {
        let mut client = FeedClient::new(TEST_URL);
        client.open("payment_notification_1").await.unwrap();
        let sub = client.subscription().unwrap();
        sub.close();
        sub.close();
    }

    #[tokio::test]
    async fn client_close_is_reentrant() {
        let mut client = FeedClient::new(TEST_URL);
        client.open("payment_notification_1").await.unwrap();
        client.close();
        client.close();
        assert!(client.subscription().is_none());
    }
}
