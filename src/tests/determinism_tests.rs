// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use serde_json::json;

use crate::checksum::{canonical_bytes, payload_checksum};
use crate::event::{OracleEvent, TypedEvent};

#[test]
fn test_checksum_is_stable_across_calls() {
    let payload = json!({"assertionId": "X", "weight": "3", "support": false, "voter": "0xv"});
    let a = payload_checksum(&payload);
    let b = payload_checksum(&payload.clone());
    assert_eq!(a, b, "Checksum must be deterministic");
    assert_eq!(a.len(), 64);
}

#[test]
fn test_reserialized_payload_keeps_checksum() {
    // A payload that went through a store and back must still verify.
    let payload = json!({"id": "X", "nested": {"b": [1, 2, 3], "a": null}});
    let text = serde_json::to_string(&payload).unwrap();
    let back: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(canonical_bytes(&payload), canonical_bytes(&back));
}

#[test]
fn test_decode_is_pure() {
    let e = OracleEvent {
        id: 3,
        instance_id: "i".into(),
        event_type: "assertion_disputed".into(),
        assertion_id: None,
        payload: json!({"assertionId": "X", "disputer": "0xd"}),
        payload_checksum: None,
        block_number: 7,
        log_index: 1,
    };
    assert_eq!(TypedEvent::decode(&e), TypedEvent::decode(&e));
}
