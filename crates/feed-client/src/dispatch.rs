//! Batch dispatcher: raw records in, store and presenter effects out.

use std::sync::Arc;

use crate::bus::{Batch, RawRecord};
use crate::events::{NotificationEvent, NotificationKind};
use crate::presenter::{Presenter, Severity};
use crate::store::CountStore;

/// Routes decoded notification events to the store and presenter.
///
/// Records within a batch are applied strictly in order: a later count
/// update in the same batch always wins over an earlier one.
pub struct Dispatcher<P> {
    store: Arc<CountStore>,
    presenter: P,
}

impl<P: Presenter> Dispatcher<P> {
    pub fn new(store: Arc<CountStore>, presenter: P) -> Self {
        Self { store, presenter }
    }

    pub fn store(&self) -> &CountStore {
        &self.store
    }

    /// Apply one batch. Malformed records are skipped individually and
    /// never abort the remainder of the batch.
    pub fn handle_batch(&self, batch: &Batch) {
        for record in batch {
            self.handle_record(record);
        }
    }

    fn handle_record(&self, record: &RawRecord) {
        let Some(record_type) = record.record_type.as_deref() else {
            tracing::warn!("skipping record without a type field");
            return;
        };
        let Some(payload) = record.payload.as_ref() else {
            tracing::warn!(record_type, "skipping record without a payload");
            return;
        };
        let Some(kind) = NotificationKind::classify(record_type) else {
            tracing::debug!(record_type, "ignoring unrecognized record type");
            return;
        };
        self.apply(&NotificationEvent {
            kind,
            payload: payload.clone(),
        });
    }

    fn apply(&self, event: &NotificationEvent) {
        match event.kind {
            NotificationKind::CountUpdate => self.apply_count(event),
            NotificationKind::UserMessage => self.present(event, Severity::Success, true),
            NotificationKind::InvoiceMessage => self.present(event, Severity::Success, false),
            NotificationKind::ErrorMessage => self.present(event, Severity::Danger, false),
        }
    }

    fn apply_count(&self, event: &NotificationEvent) {
        let Some(count) = event.payload.get("count").and_then(|v| v.as_i64()) else {
            tracing::warn!("count update without an integer count, skipping");
            return;
        };
        match self.store.set_count(count) {
            Ok(count) => self.presenter.update_badge(count),
            Err(e) => tracing::error!(error = %e, "count update rejected"),
        }
    }

    fn present(&self, event: &NotificationEvent, severity: Severity, sticky: bool) {
        let Some(msg) = event.payload.get("msg").and_then(|v| v.as_str()) else {
            tracing::warn!(kind = ?event.kind, "message record without msg text, skipping");
            return;
        };
        self.presenter.present_message(msg, severity, sticky);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use serde_json::json;

    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    enum Effect {
        Message(String, Severity, bool),
        Badge(u64),
    }

    #[derive(Clone, Default)]
    struct RecordingPresenter {
        effects: Arc<Mutex<Vec<Effect>>>,
    }

    impl RecordingPresenter {
        fn effects(&self) -> Vec<Effect> {
            self.effects.lock().unwrap().clone()
        }
    }

    impl Presenter for RecordingPresenter {
        fn present_message(&self, text: &str, severity: Severity, sticky: bool) {
            self.effects
                .lock()
                .unwrap()
                .push(Effect::Message(text.into(), severity, sticky));
        }

        fn update_badge(&self, count: u64) {
            self.effects.lock().unwrap().push(Effect::Badge(count));
        }
    }

    fn dispatcher() -> (Dispatcher<RecordingPresenter>, RecordingPresenter) {
        let presenter = RecordingPresenter::default();
        (
            Dispatcher::new(Arc::new(CountStore::new()), presenter.clone()),
            presenter,
        )
    }

    fn record(record_type: &str, payload: serde_json::Value) -> RawRecord {
        RawRecord {
            record_type: Some(record_type.into()),
            payload: Some(payload),
        }
    }

    #[test]
    fn last_count_update_wins() {
        let (d, _) = dispatcher();
        d.handle_batch(&vec![
            record("count_notification", json!({ "count": 1 })),
            record("notify_user", json!({ "msg": "hello" })),
            record("count_notification", json!({ "count": 5 })),
            record("invoice", json!({ "msg": "paid" })),
            record("count_notification", json!({ "count": 3 })),
        ]);
        assert_eq!(d.store().count(), 3);
    }

    #[test]
    fn count_update_and_sticky_message() {
        let (d, p) = dispatcher();
        d.handle_batch(&vec![
            record("count_notification", json!({ "count": 3 })),
            record("notify_user", json!({ "msg": "hi" })),
        ]);

        assert_eq!(d.store().count(), 3);
        assert_eq!(
            p.effects(),
            vec![
                Effect::Badge(3),
                Effect::Message("hi".into(), Severity::Success, true),
            ]
        );
    }

    #[test]
    fn sms_error_is_transient_danger() {
        let (d, p) = dispatcher();
        d.handle_batch(&vec![record("sms_error", json!({ "msg": "failed" }))]);

        assert_eq!(d.store().count(), 0);
        assert_eq!(
            p.effects(),
            vec![Effect::Message("failed".into(), Severity::Danger, false)]
        );
    }

    #[test]
    fn invoice_is_transient_success() {
        let (d, p) = dispatcher();
        d.handle_batch(&vec![record("invoice", json!({ "msg": "INV/001 paid" }))]);

        assert_eq!(
            p.effects(),
            vec![Effect::Message("INV/001 paid".into(), Severity::Success, false)]
        );
    }

    #[test]
    fn malformed_record_does_not_abort_batch() {
        let valid_only = vec![
            record("count_notification", json!({ "count": 2 })),
            record("invoice", json!({ "msg": "paid" })),
        ];
        let mut with_malformed = valid_only.clone();
        with_malformed.insert(
            1,
            RawRecord {
                record_type: None,
                payload: Some(json!({})),
            },
        );
        with_malformed.insert(
            2,
            RawRecord {
                record_type: Some("invoice".into()),
                payload: None,
            },
        );

        let (d, p) = dispatcher();
        d.handle_batch(&with_malformed);

        let (d2, p2) = dispatcher();
        d2.handle_batch(&valid_only);

        assert_eq!(d.store().count(), d2.store().count());
        assert_eq!(p.effects(), p2.effects());
    }

    #[test]
    fn unknown_kind_is_ignored() {
        let (d, p) = dispatcher();
        d.handle_batch(&vec![
            record("email_error", json!({ "msg": "nope" })),
            record("count_notification", json!({ "count": 1 })),
        ]);

        assert_eq!(d.store().count(), 1);
        assert_eq!(p.effects(), vec![Effect::Badge(1)]);
    }

    #[test]
    fn negative_count_is_rejected_but_batch_continues() {
        let (d, p) = dispatcher();
        d.handle_batch(&vec![
            record("count_notification", json!({ "count": -2 })),
            record("notify_user", json!({ "msg": "still here" })),
        ]);

        assert_eq!(d.store().count(), 0);
        assert_eq!(
            p.effects(),
            vec![Effect::Message("still here".into(), Severity::Success, true)]
        );
    }

    #[test]
    fn count_without_integer_is_skipped() {
        let (d, p) = dispatcher();
        d.handle_batch(&vec![record("count_notification", json!({ "count": "three" }))]);

        assert_eq!(d.store().count(), 0);
        assert!(p.effects().is_empty());
    }
}
