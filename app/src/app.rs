use std::sync::Arc;

use feed_client::store::CountStore;
use tokio::sync::{RwLock, broadcast};
use tokio_util::sync::CancellationToken;

use crate::config::AppConfig;

/// Application shared state accessible from every task.
#[derive(Clone)]
pub struct SharedState {
    inner: Arc<SharedStateInner>,
}

struct SharedStateInner {
    /// Broadcast channel for overlay frames
    overlay_tx: broadcast::Sender<String>,
    /// Application configuration (reloadable)
    config: RwLock<AppConfig>,
    /// Unread-count store shared with the dispatcher
    store: Arc<CountStore>,
    /// Cancelled once at process shutdown
    shutdown: CancellationToken,
}

impl SharedState {
    pub fn new(config: AppConfig) -> Self {
        let (overlay_tx, _) = broadcast::channel(2048);

        Self {
            inner: Arc::new(SharedStateInner {
                overlay_tx,
                config: RwLock::new(config),
                store: Arc::new(CountStore::new()),
                shutdown: CancellationToken::new(),
            }),
        }
    }

    pub fn overlay_sender(&self) -> &broadcast::Sender<String> {
        &self.inner.overlay_tx
    }

    pub fn subscribe_overlay(&self) -> broadcast::Receiver<String> {
        self.inner.overlay_tx.subscribe()
    }

    pub fn store(&self) -> Arc<CountStore> {
        Arc::clone(&self.inner.store)
    }

    /// Get a read lock on the current config.
    pub async fn config(&self) -> tokio::sync::RwLockReadGuard<'_, AppConfig> {
        self.inner.config.read().await
    }

    pub fn request_shutdown(&self) {
        self.inner.shutdown.cancel();
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.inner.shutdown.clone()
    }
}
