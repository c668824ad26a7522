//! Feed handler — drives the bus subscription and dispatches batches.

use feed_client::api::BackofficeClient;
use feed_client::bus::RawRecord;
use feed_client::dispatch::Dispatcher;
use feed_client::presenter::{Presenter, Severity};
use feed_client::subscription::{FeedClient, partner_channel};
use serde_json::json;

use crate::app::SharedState;
use crate::presenter::BroadcastPresenter;

/// Run the notification feed until shutdown.
///
/// Seeds the unread count from the back office, then keeps the bus
/// subscription open and applies every delivered batch in order. The bus
/// client reconnects on its own; this loop only ends on shutdown or when
/// the batch stream closes.
pub async fn run(state: SharedState) {
    let shutdown = state.shutdown_token();
    let presenter = BroadcastPresenter::new(state.overlay_sender().clone());
    let dispatcher = Dispatcher::new(state.store(), presenter.clone());

    let (bus_url, backoffice_url, partner_id, clear_on_start) = {
        let config = state.config().await;
        (
            config.bus_url.clone(),
            config.backoffice_url.clone(),
            config.partner_id,
            config.clear_on_start,
        )
    };

    let api = BackofficeClient::new(backoffice_url);
    seed_unread_count(&api, &dispatcher, &presenter).await;
    if clear_on_start {
        clear_notifications(&api, &presenter).await;
    }

    let channel = partner_channel(partner_id);
    let mut client = FeedClient::new(bus_url);

    tracing::info!(channel = %channel, "Opening feed subscription");
    let mut batches = match client.open(&channel).await {
        Ok(Some(rx)) => rx,
        Ok(None) => return,
        Err(e) => {
            tracing::error!("Feed subscription failed: {e}");
            return;
        }
    };

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                client.close();
                break;
            }
            received = batches.recv() => match received {
                Some(batch) => dispatcher.handle_batch(&batch),
                None => {
                    tracing::warn!("Feed stream ended");
                    break;
                }
            }
        }
    }

    tracing::info!("Feed handler stopped");
}

/// Fetch the unread count once and route it through the dispatcher as a
/// regular count update, so the seed takes the same path as live pushes.
async fn seed_unread_count<P: Presenter>(
    api: &BackofficeClient,
    dispatcher: &Dispatcher<P>,
    presenter: &BroadcastPresenter,
) {
    match api.unread_count().await {
        Ok(count) => {
            tracing::info!(count, "Unread count fetched");
            let seed = RawRecord {
                record_type: Some("count_notification".into()),
                payload: Some(json!({ "count": count })),
            };
            dispatcher.handle_batch(&vec![seed]);
        }
        Err(e) => {
            tracing::error!("Error fetching notification count: {e}");
            presenter.present_message("Failed to fetch notifications", Severity::Danger, false);
        }
    }
}

/// Mark everything read at startup; the reset count arrives as a push.
async fn clear_notifications(api: &BackofficeClient, presenter: &BroadcastPresenter) {
    match api.mark_all_read().await {
        Ok(ack) => tracing::info!(marked = ack.marked, "Notifications cleared"),
        Err(e) => {
            tracing::error!("Error clearing notifications: {e}");
            presenter.present_message("Failed to clear notifications", Severity::Danger, false);
        }
    }
}
