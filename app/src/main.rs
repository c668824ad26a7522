//! Headless payment-notification feed monitor.
//!
//! Connects to the back office's websocket bus, keeps the unread counter,
//! and fans presentation frames out to overlay clients.

mod app;
mod config;
mod handler;
mod presenter;
mod server;

use feed_client::api::{BackofficeClient, weather};
use tokio::signal;
use tracing_subscriber::EnvFilter;

use crate::app::SharedState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting payfeed monitor");

    let config = config::load()?;
    let state = SharedState::new(config);

    startup_snapshot(&state).await;

    let s = state.clone();
    tokio::spawn(async move {
        if let Err(e) = server::start_server(s).await {
            tracing::error!("Overlay server failed: {e}");
        }
    });

    let s = state.clone();
    let feed = tokio::spawn(async move { handler::run(s).await });

    signal::ctrl_c().await?;
    tracing::info!("Shutdown requested");
    state.request_shutdown();
    let _ = feed.await;
    tracing::info!("Shutdown complete");
    Ok(())
}

/// One-shot startup fetches. Failures are logged, never fatal: the feed
/// works without the dashboard or the weather collaborator.
async fn startup_snapshot(state: &SharedState) {
    let (backoffice_url, weather_coords) = {
        let config = state.config().await;
        (config.backoffice_url.clone(), config.weather)
    };

    let api = BackofficeClient::new(backoffice_url);
    match api.dashboard_snapshot().await {
        Ok(snapshot) => tracing::info!(
            total_payments = snapshot.data.compliance_stats.total_payments,
            underpaid = snapshot.data.compliance_stats.underpaid_count,
            overpaid = snapshot.data.compliance_stats.overpaid_count,
            fetched_at = %snapshot.fetched_at,
            "Dashboard snapshot loaded"
        ),
        Err(e) => tracing::warn!("Dashboard snapshot unavailable: {e}"),
    }

    if let Some((lat, lon)) = weather_coords {
        match weather::current_coordinates(lat, lon).await {
            Ok(c) => tracing::info!(lat = c.lat, lon = c.lon, "Weather service reachable"),
            Err(e) => tracing::warn!("Weather fetch failed: {e}"),
        }
    }
}
