// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Payload Checksums
//!
//! Every event payload may carry a BLAKE3 digest computed by the producer.
//! The digest covers the canonical JSON encoding of the payload:
//! - object keys sorted (bytewise, recursively)
//! - no insignificant whitespace
//! - arrays keep their order
//!
//! The canonical form does not depend on how `serde_json` was compiled
//! (`preserve_order` or not), so producer and consumer agree even if one of
//! them enables that feature.
//!
//! A missing checksum is accepted. Legacy producers never wrote one and the
//! log cannot be rewritten; this is compatibility, not integrity.

use serde_json::{Map, Value};

use crate::config::CHECKSUM_HEX_LEN;

/// Rebuild `value` with every object's keys in sorted order.
fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut out = Map::with_capacity(map.len());
            for key in keys {
                out.insert(key.clone(), canonicalize(&map[key]));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

/// Canonical byte encoding of a payload.
pub fn canonical_bytes(payload: &Value) -> Vec<u8> {
    // Serializing a `Value` cannot fail: keys are strings and numbers are finite.
    serde_json::to_vec(&canonicalize(payload)).unwrap_or_default()
}

/// Raw BLAKE3 digest of the canonical payload.
pub fn payload_digest(payload: &Value) -> [u8; 32] {
    blake3::hash(&canonical_bytes(payload)).into()
}

/// Lower-case hex checksum, as stored in `payload_checksum`.
pub fn payload_checksum(payload: &Value) -> String {
    hex::encode(payload_digest(payload))
}

/// Check a payload against its stored checksum.
///
/// Returns `true` when `expected` is absent. An empty or whitespace-only
/// string counts as absent. A present but undecodable checksum never
/// verifies.
pub fn verify(payload: &Value, expected: Option<&str>) -> bool {
    let Some(expected) = expected.map(str::trim).filter(|s| !s.is_empty()) else {
        return true;
    };
    let expected = expected.strip_prefix("0x").unwrap_or(expected);
    if expected.len() != CHECKSUM_HEX_LEN {
        return false;
    }
    let mut want = [0u8; 32];
    if hex::decode_to_slice(expected, &mut want).is_err() {
        return false;
    }
    payload_digest(payload) == want
}
