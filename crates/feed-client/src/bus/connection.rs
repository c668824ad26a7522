use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::connect_async;

use super::*;

/// One pushed notification with its bus-assigned sequence id.
#[derive(Debug, Deserialize)]
struct Envelope {
    id: u64,
    message: RawRecord,
}

impl BusClient {
    pub(super) async fn connect_once(
        config: &BusConfig,
        cursor: &mut u64,
        batch_tx: &mpsc::Sender<Batch>,
        shutdown_rx: &mut mpsc::Receiver<()>,
        state_tx: &watch::Sender<SubscriptionState>,
    ) -> Result<(), FeedError> {
        use tokio_tungstenite::tungstenite::Message as Msg;

        tracing::info!(server_url = %config.server_url, channel = %config.channel, "connecting to bus");
        let (mut ws, _) = connect_async(config.server_url.as_str()).await?;

        let frame = Self::subscribe_frame(&config.channel, *cursor);
        ws.send(Msg::Text(frame.into())).await?;
        let _ = state_tx.send(SubscriptionState::Connected);
        tracing::info!(channel = %config.channel, last = *cursor, "bus subscription active");

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    tracing::info!("bus shutdown during listen");
                    let _ = ws.close(None).await;
                    return Ok(());
                }
                result = tokio::time::timeout(SILENCE_TIMEOUT, ws.next()) => {
                    match result {
                        Ok(Some(Ok(Msg::Text(text)))) => {
                            if let Some(batch) = Self::decode_frame(&text, cursor)? {
                                // Connected -> Connected self-transition per delivered batch.
                                let _ = state_tx.send(SubscriptionState::Connected);
                                if batch_tx.send(batch).await.is_err() {
                                    tracing::info!("batch receiver dropped, closing bus connection");
                                    let _ = ws.close(None).await;
                                    return Ok(());
                                }
                            }
                        }
                        Ok(Some(Ok(Msg::Ping(data)))) => {
                            let _ = ws.send(Msg::Pong(data)).await;
                        }
                        Ok(Some(Ok(Msg::Close(_)))) | Ok(None) => {
                            tracing::warn!("bus WebSocket closed by server");
                            return Err(FeedError::Bus("server closed".into()));
                        }
                        Ok(Some(Err(e))) => return Err(FeedError::WebSocket(e)),
                        Ok(Some(Ok(_))) => {}
                        Err(_) => {
                            tracing::warn!("bus silent past timeout");
                            return Err(FeedError::Timeout);
                        }
                    }
                }
            }
        }
    }

    /// Build the channel subscription frame. `last` is the resume cursor:
    /// the highest notification id already delivered, 0 on a first connect.
    pub(super) fn subscribe_frame(channel: &str, last: u64) -> String {
        serde_json::json!({
            "event_name": "subscribe",
            "data": { "channels": [channel], "last": last },
        })
        .to_string()
    }

    /// Decode one text frame into a batch, advancing the resume cursor.
    ///
    /// Record order within the frame is preserved. An empty frame yields
    /// no batch.
    pub(super) fn decode_frame(text: &str, cursor: &mut u64) -> Result<Option<Batch>, FeedError> {
        let envelopes: Vec<Envelope> = serde_json::from_str(text)?;
        if envelopes.is_empty() {
            return Ok(None);
        }
        let mut batch = Vec::with_capacity(envelopes.len());
        for envelope in envelopes {
            *cursor = (*cursor).max(envelope.id);
            batch.push(envelope.message);
        }
        Ok(Some(batch))
    }
}
