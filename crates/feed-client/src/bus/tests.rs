use super::*;

#[test]
fn decode_frame_preserves_order_and_advances_cursor() {
    let text = serde_json::json!([
        { "id": 4, "message": { "type": "count_notification", "payload": { "count": 2 } } },
        { "id": 5, "message": { "type": "invoice", "payload": { "msg": "paid" } } },
    ])
    .to_string();

    let mut cursor = 0;
    let batch = BusClient::decode_frame(&text, &mut cursor).unwrap().unwrap();

    assert_eq!(batch.len(), 2);
    assert_eq!(batch[0].record_type.as_deref(), Some("count_notification"));
    assert_eq!(batch[1].record_type.as_deref(), Some("invoice"));
    assert_eq!(cursor, 5);
}

#[test]
fn decode_frame_empty_array_yields_no_batch() {
    let mut cursor = 7;
    assert!(BusClient::decode_frame("[]", &mut cursor).unwrap().is_none());
    assert_eq!(cursor, 7);
}

#[test]
fn decode_frame_keeps_malformed_records_for_the_dispatcher() {
    let text = serde_json::json!([
        { "id": 1, "message": { "payload": { "count": 1 } } },
        { "id": 2, "message": { "type": "notify_user" } },
    ])
    .to_string();

    let mut cursor = 0;
    let batch = BusClient::decode_frame(&text, &mut cursor).unwrap().unwrap();

    assert!(batch[0].record_type.is_none());
    assert!(batch[1].payload.is_none());
}

#[test]
fn decode_frame_cursor_never_regresses() {
    let text = serde_json::json!([
        { "id": 3, "message": { "type": "invoice", "payload": {} } },
    ])
    .to_string();

    let mut cursor = 9;
    BusClient::decode_frame(&text, &mut cursor).unwrap();
    assert_eq!(cursor, 9);
}

#[test]
fn decode_frame_rejects_non_array_frames() {
    let mut cursor = 0;
    assert!(BusClient::decode_frame(r#"{"event":"pong"}"#, &mut cursor).is_err());
}

#[test]
fn subscribe_frame_carries_channel_and_cursor() {
    let frame = BusClient::subscribe_frame("payment_notification_7", 42);
    let v: serde_json::Value = serde_json::from_str(&frame).unwrap();

    assert_eq!(v["event_name"], "subscribe");
    assert_eq!(v["data"]["channels"][0], "payment_notification_7");
    assert_eq!(v["data"]["last"], 42);
}
