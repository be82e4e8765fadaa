// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Identity helpers.

use crate::config::DISPUTE_ID_PREFIX;

/// Deterministic dispute id for an assertion.
///
/// One assertion maps to exactly one dispute id, so a replayed
/// `assertion_disputed` always lands on the same row.
pub fn dispute_id_for(assertion_id: &str) -> String {
    let mut id = String::with_capacity(DISPUTE_ID_PREFIX.len() + assertion_id.len());
    id.push_str(DISPUTE_ID_PREFIX);
    id.push_str(assertion_id);
    id
}

/// Inverse of [`dispute_id_for`].
pub fn assertion_id_of(dispute_id: &str) -> Option<&str> {
    dispute_id.strip_prefix(DISPUTE_ID_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispute_id_roundtrip() {
        let id = dispute_id_for("0xabc");
        assert_eq!(id, "D:0xabc");
        assert_eq!(assertion_id_of(&id), Some("0xabc"));
        assert_eq!(assertion_id_of("0xabc"), None);
    }
}
