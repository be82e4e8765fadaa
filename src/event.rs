// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Oracle Event Log Records
//!
//! `OracleEvent` is the raw, immutable record written by the upstream chain
//! indexer. `TypedEvent` is what the rest of the system works with: the
//! event tag is checked and the payload deserialized exactly once, at
//! [`TypedEvent::decode`].
//!
//! # Ordering
//! Within an instance, `(block_number, log_index, id)` is a total order.
//! `id` is the log's insertion sequence and only breaks ties the chain
//! itself cannot (e.g. a re-indexed log line).

use core::fmt;
use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::checksum;
use crate::error::DecodeError;

/// A log record as persisted by the producer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleEvent {
    pub id: u64,
    pub instance_id: String,
    pub event_type: String,
    pub assertion_id: Option<String>,
    pub payload: Value,
    pub payload_checksum: Option<String>,
    pub block_number: u64,
    pub log_index: u32,
}

impl OracleEvent {
    pub fn ordering_key(&self) -> (u64, u32, u64) {
        (self.block_number, self.log_index, self.id)
    }

    pub fn checksum_ok(&self) -> bool {
        checksum::verify(&self.payload, self.payload_checksum.as_deref())
    }
}

/// A record about to be appended; the log assigns `id`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOracleEvent {
    pub instance_id: String,
    pub event_type: String,
    #[serde(default)]
    pub assertion_id: Option<String>,
    pub payload: Value,
    #[serde(default)]
    pub payload_checksum: Option<String>,
    pub block_number: u64,
    pub log_index: u32,
}

impl NewOracleEvent {
    pub fn new(
        instance_id: impl Into<String>,
        kind: EventKind,
        payload: Value,
        block_number: u64,
        log_index: u32,
    ) -> Self {
        Self {
            instance_id: instance_id.into(),
            event_type: kind.as_str().to_string(),
            assertion_id: None,
            payload,
            payload_checksum: None,
            block_number,
            log_index,
        }
    }

    pub fn with_assertion_id(mut self, assertion_id: impl Into<String>) -> Self {
        self.assertion_id = Some(assertion_id.into());
        self
    }

    /// Stamp the payload's canonical checksum.
    pub fn checksummed(mut self) -> Self {
        self.payload_checksum = Some(checksum::payload_checksum(&self.payload));
        self
    }

    pub fn into_event(self, id: u64) -> OracleEvent {
        OracleEvent {
            id,
            instance_id: self.instance_id,
            event_type: self.event_type,
            assertion_id: self.assertion_id,
            payload: self.payload,
            payload_checksum: self.payload_checksum,
            block_number: self.block_number,
            log_index: self.log_index,
        }
    }
}

/// The four event kinds the applier understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    AssertionCreated,
    AssertionDisputed,
    VoteCast,
    AssertionResolved,
}

impl EventKind {
    pub const ALL: [EventKind; 4] = [
        EventKind::AssertionCreated,
        EventKind::AssertionDisputed,
        EventKind::VoteCast,
        EventKind::AssertionResolved,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::AssertionCreated => "assertion_created",
            EventKind::AssertionDisputed => "assertion_disputed",
            EventKind::VoteCast => "vote_cast",
            EventKind::AssertionResolved => "assertion_resolved",
        }
    }
}

impl FromStr for EventKind {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| DecodeError::UnknownEventType(s.to_string()))
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssertionCreated {
    #[serde(default)]
    pub id: String,
    pub chain: Option<String>,
    pub asserter: Option<String>,
    pub claim: Option<String>,
    pub market: Option<String>,
    #[serde(default, with = "crate::types::amount::option")]
    pub bond: Option<u128>,
    pub currency: Option<String>,
    pub identifier: Option<String>,
    pub asserted_at: Option<DateTime<Utc>>,
    pub liveness_ends_at: Option<DateTime<Utc>>,
    pub tx_hash: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssertionDisputed {
    pub assertion_id: Option<String>,
    pub chain: Option<String>,
    pub disputer: Option<String>,
    pub disputed_at: Option<DateTime<Utc>>,
    pub voting_ends_at: Option<DateTime<Utc>>,
    pub tx_hash: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteCast {
    pub assertion_id: Option<String>,
    pub chain: Option<String>,
    #[serde(default)]
    pub voter: String,
    /// Required. A vote without a direction is never counted either way.
    pub support: bool,
    #[serde(default, with = "crate::types::amount::option")]
    pub weight: Option<u128>,
    pub tx_hash: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssertionResolved {
    pub assertion_id: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub settlement_resolution: Option<bool>,
}

/// A decoded event. Variants that refer to an existing assertion carry the
/// resolved `assertion_id`: the payload's own field, or the log row's
/// association when the payload omits it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypedEvent {
    AssertionCreated(AssertionCreated),
    AssertionDisputed { assertion_id: String, body: AssertionDisputed },
    VoteCast { assertion_id: String, body: VoteCast },
    AssertionResolved { assertion_id: String, body: AssertionResolved },
}

fn parse_payload<T: DeserializeOwned>(kind: EventKind, payload: &Value) -> Result<T, DecodeError> {
    T::deserialize(payload).map_err(|e| DecodeError::Schema {
        event_type: kind.as_str(),
        reason: e.to_string(),
    })
}

fn resolve_assertion_id(
    kind: EventKind,
    from_payload: Option<&String>,
    from_row: Option<&String>,
) -> Result<String, DecodeError> {
    from_payload
        .filter(|id| !id.is_empty())
        .or(from_row.filter(|id| !id.is_empty()))
        .cloned()
        .ok_or_else(|| DecodeError::Schema {
            event_type: kind.as_str(),
            reason: "missing assertionId".to_string(),
        })
}

impl TypedEvent {
    pub fn decode(event: &OracleEvent) -> Result<Self, DecodeError> {
        let kind: EventKind = event.event_type.parse()?;
        let row_assertion = event.assertion_id.as_ref();

        match kind {
            EventKind::AssertionCreated => {
                let body: AssertionCreated = parse_payload(kind, &event.payload)?;
                if body.id.is_empty() {
                    return Err(DecodeError::Schema {
                        event_type: kind.as_str(),
                        reason: "missing id".to_string(),
                    });
                }
                Ok(TypedEvent::AssertionCreated(body))
            }
            EventKind::AssertionDisputed => {
                let body: AssertionDisputed = parse_payload(kind, &event.payload)?;
                let assertion_id = resolve_assertion_id(kind, body.assertion_id.as_ref(), row_assertion)?;
                Ok(TypedEvent::AssertionDisputed { assertion_id, body })
            }
            EventKind::VoteCast => {
                let body: VoteCast = parse_payload(kind, &event.payload)?;
                let assertion_id = resolve_assertion_id(kind, body.assertion_id.as_ref(), row_assertion)?;
                Ok(TypedEvent::VoteCast { assertion_id, body })
            }
            EventKind::AssertionResolved => {
                let body: AssertionResolved = parse_payload(kind, &event.payload)?;
                let assertion_id = resolve_assertion_id(kind, body.assertion_id.as_ref(), row_assertion)?;
                Ok(TypedEvent::AssertionResolved { assertion_id, body })
            }
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            TypedEvent::AssertionCreated(_) => EventKind::AssertionCreated,
            TypedEvent::AssertionDisputed { .. } => EventKind::AssertionDisputed,
            TypedEvent::VoteCast { .. } => EventKind::VoteCast,
            TypedEvent::AssertionResolved { .. } => EventKind::AssertionResolved,
        }
    }

    pub fn assertion_id(&self) -> &str {
        match self {
            TypedEvent::AssertionCreated(body) => &body.id,
            TypedEvent::AssertionDisputed { assertion_id, .. }
            | TypedEvent::VoteCast { assertion_id, .. }
            | TypedEvent::AssertionResolved { assertion_id, .. } => assertion_id,
        }
    }
}
