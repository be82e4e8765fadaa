use std::io::Write;

use oracle_cli::commands::{assertion, dispute, ingest, replay, votes};
use oracle_kernel::checksum::payload_checksum;
use oracle_kernel::types::{AssertionStatus, DisputeStatus};
use serde_json::json;
use tempfile::tempdir;

fn write_lines(path: &std::path::Path, lines: &[serde_json::Value]) {
    let mut f = std::fs::File::create(path).unwrap();
    for line in lines {
        writeln!(f, "{line}").unwrap();
    }
    writeln!(f).unwrap();
}

fn scenario() -> Vec<serde_json::Value> {
    let ev = |kind: &str, payload: serde_json::Value, block: u64, log_index: u32| {
        json!({
            "eventType": kind,
            "assertionId": "X",
            "payload": payload,
            "blockNumber": block,
            "logIndex": log_index,
        })
    };
    vec![
        ev("assertion_created", json!({"id": "X", "chain": "polygon", "claim": "It rained"}), 100, 0),
        ev("assertion_disputed", json!({"assertionId": "X", "disputer": "0xD"}), 101, 0),
        ev("vote_cast", json!({"voter": "0x1", "support": true, "txHash": "0xa"}), 102, 0),
        ev("vote_cast", json!({"voter": "0x2", "support": true, "txHash": "0xb"}), 102, 1),
        ev("vote_cast", json!({"voter": "0x3", "support": false, "txHash": "0xc"}), 103, 0),
        ev("assertion_resolved", json!({"assertionId": "X", "settlementResolution": true}), 104, 0),
    ]
}

#[test]
fn test_ingest_replay_inspect_workflow() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("oracle.db");
    let input = dir.path().join("events.jsonl");
    write_lines(&input, &scenario());

    let summary = ingest::run(Some(db.clone()), &input, "default", true).unwrap();
    assert_eq!(summary.appended, 6);
    assert_eq!(summary.stamped, 6);
    assert_eq!(summary.blank, 1);

    let report = replay::run(Some(db.clone()), "default", 100, 104, Some(2), false).unwrap();
    assert_eq!(report.scanned, 6);
    assert_eq!(report.applied, 6);

    let found = assertion::run(Some(db.clone()), "default", Some("X"), 10).unwrap();
    assert_eq!(found[0].status, AssertionStatus::Resolved);
    assert_eq!(found[0].settlement_resolution, Some(true));

    let listed = assertion::run(Some(db.clone()), "default", None, 10).unwrap();
    assert_eq!(listed.len(), 1);

    // Either id form works.
    let d = dispute::run(Some(db.clone()), "default", "X").unwrap().unwrap();
    assert_eq!(d.status, DisputeStatus::Executed);
    assert_eq!((d.current_votes_for, d.current_votes_against, d.total_votes), (2, 1, 3));
    assert_eq!(dispute::run(Some(db.clone()), "default", "D:X").unwrap(), Some(d));

    let v = votes::run(Some(db.clone()), "default", "X").unwrap();
    assert_eq!(v.len(), 3);

    // Replaying again changes nothing.
    let again = replay::run(Some(db.clone()), "default", 100, 104, None, false).unwrap();
    assert_eq!(again.applied, 6);
    assert_eq!(votes::run(Some(db), "default", "X").unwrap(), v);
}

#[test]
fn test_tampered_line_is_reported_not_applied() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("oracle.db");
    let input = dir.path().join("events.jsonl");

    let payload = json!({"id": "T", "chain": "base"});
    let good_sum = payload_checksum(&payload);
    write_lines(
        &input,
        &[
            json!({"eventType": "assertion_created", "payload": {"id": "T", "chain": "evil"},
                   "payloadChecksum": good_sum, "blockNumber": 5, "logIndex": 0}),
            json!({"eventType": "assertion_created", "payload": {"id": "U"}, "blockNumber": 5, "logIndex": 1}),
        ],
    );

    let summary = ingest::run(Some(db.clone()), &input, "default", false).unwrap();
    assert_eq!(summary.stamped, 0);

    let report = replay::run(Some(db.clone()), "default", 0, 10, None, false).unwrap();
    assert_eq!(report.checksum_rejected, 1);
    assert_eq!(report.applied, 1);
    assert!(assertion::run(Some(db), "default", Some("T"), 10).unwrap().is_empty());
}

#[test]
fn test_missing_records_are_not_errors() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("empty.db");

    assert!(assertion::run(Some(db.clone()), "default", Some("nope"), 10).unwrap().is_empty());
    assert!(dispute::run(Some(db.clone()), "default", "nope").unwrap().is_none());
    assert!(votes::run(Some(db), "default", "nope").unwrap().is_empty());
}

#[test]
fn test_bad_ingest_line_names_the_line() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("bad.jsonl");
    std::fs::write(&input, "{\"eventType\":\"vote_cast\"}\n").unwrap();

    let err = ingest::run(Some(dir.path().join("o.db")), &input, "default", false).unwrap_err();
    assert!(format!("{err:#}").contains("line 1"));
}
