//! Typed notification events.

use serde::{Deserialize, Serialize};

/// Closed set of notification kinds understood by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    CountUpdate,
    UserMessage,
    InvoiceMessage,
    ErrorMessage,
}

impl NotificationKind {
    /// Map a wire `type` string to a kind.
    ///
    /// Unknown strings map to `None` so that new server-side kinds are
    /// ignored instead of breaking older clients.
    pub fn classify(record_type: &str) -> Option<Self> {
        match record_type {
            "count_notification" => Some(Self::CountUpdate),
            "notify_user" => Some(Self::UserMessage),
            "invoice" => Some(Self::InvoiceMessage),
            "sms_error" => Some(Self::ErrorMessage),
            _ => None,
        }
    }
}

/// One decoded notification. Immutable once built.
#[derive(Debug, Clone)]
pub struct NotificationEvent {
    pub kind: NotificationKind,
    pub payload: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_known_kinds() {
        assert_eq!(
            NotificationKind::classify("count_notification"),
            Some(NotificationKind::CountUpdate)
        );
        assert_eq!(
            NotificationKind::classify("notify_user"),
            Some(NotificationKind::UserMessage)
        );
        assert_eq!(
            NotificationKind::classify("invoice"),
            Some(NotificationKind::InvoiceMessage)
        );
        assert_eq!(
            NotificationKind::classify("sms_error"),
            Some(NotificationKind::ErrorMessage)
        );
    }

    #[test]
    fn classify_unknown_is_none() {
        assert_eq!(NotificationKind::classify("email_error"), None);
        assert_eq!(NotificationKind::classify(""), None);
    }
}
