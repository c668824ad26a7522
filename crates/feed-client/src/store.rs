//! Unread-count store.

use tokio::sync::watch;

use crate::FeedError;

/// Single source of truth for the unread notification count.
///
/// The only mutator is [`CountStore::set_count`]; every change is
/// therefore traceable to a count-update event flowing through the
/// dispatcher.
#[derive(Debug)]
pub struct CountStore {
    count_tx: watch::Sender<u64>,
}

impl CountStore {
    pub fn new() -> Self {
        let (count_tx, _) = watch::channel(0);
        Self { count_tx }
    }

    /// Replace the count. Rejects negative values; observers are notified
    /// synchronously on success and state is untouched on failure.
    pub fn set_count(&self, count: i64) -> Result<u64, FeedError> {
        if count < 0 {
            return Err(FeedError::InvalidCount { value: count });
        }
        let count = count as u64;
        self.count_tx.send_replace(count);
        Ok(count)
    }

    pub fn count(&self) -> u64 {
        *self.count_tx.borrow()
    }

    /// Observe count changes. The current value is readable immediately.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.count_tx.subscribe()
    }
}

impl Default for CountStore {
    fn default() -> Self {
        Self::new()
    }
}
