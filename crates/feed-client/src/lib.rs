//! Payment-notification feed client library.
//!
//! Provides the websocket bus transport, typed event dispatch,
//! unread-count store, and the back-office REST client.

pub mod api;
pub mod bus;
pub mod dispatch;
pub mod events;
pub mod presenter;
pub mod store;
pub mod subscription;

/// Unified error type for the feed-client crate.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("back office API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("bus error: {0}")]
    Bus(String),

    #[error("channel id must not be empty")]
    EmptyChannel,

    #[error("unread count must not be negative (got {value})")]
    InvalidCount { value: i64 },

    #[error("connection timeout")]
    Timeout,
}
