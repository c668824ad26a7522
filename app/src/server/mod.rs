//! Overlay HTTP + WebSocket server.
//!
//! Serves the frames produced by the presenter to overlay clients.

pub mod websocket;

use anyhow::Result;
use axum::{Router, routing::get};
use tower_http::cors::CorsLayer;

use crate::app::SharedState;

/// Start the axum HTTP + WebSocket server.
pub async fn start_server(state: SharedState) -> Result<()> {
    let port = state.config().await.server_port;
    let shutdown_token = state.shutdown_token();
    let app = create_router(state);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Overlay server listening on http://{addr}");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async move {
            shutdown_token.cancelled().await;
        })
        .await?;

    Ok(())
}

fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/status", get(status_handler))
        .route("/ws", get(websocket::ws_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn status_handler() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
