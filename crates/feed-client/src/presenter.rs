//! Presentation seam consumed by the dispatcher.

use serde::{Deserialize, Serialize};

/// Visual severity of a presented message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Danger,
}

/// Rendering-side sink for feed effects.
///
/// Implementations must not block: the dispatcher applies records
/// sequentially and a slow presenter would stall the whole feed.
pub trait Presenter {
    /// Show a user-facing message. Sticky messages persist until
    /// dismissed; transient ones auto-expire.
    fn present_message(&self, text: &str, severity: Severity, sticky: bool);

    /// Reflect a new unread count on the badge.
    fn update_badge(&self, count: u64);
}
