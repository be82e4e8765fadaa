// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::AssertionStatus;

/// Current view of one proposed claim.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assertion {
    pub id: String,
    pub chain: String,
    pub status: AssertionStatus,
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
    pub disputer: Option<String>,
    pub disputed_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub settlement_resolution: Option<bool>,
}

impl Assertion {
    /// A fresh Pending assertion with no descriptive fields.
    pub fn pending(id: impl Into<String>, chain: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            chain: chain.into(),
            status: AssertionStatus::Pending,
            asserter: None,
            claim: None,
            market: None,
            bond: None,
            currency: None,
            identifier: None,
            asserted_at: None,
            liveness_ends_at: None,
            tx_hash: None,
            disputer: None,
            disputed_at: None,
            resolved_at: None,
            settlement_resolution: None,
        }
    }

    /// Pending -> Disputed. A resolved assertion stays resolved.
    pub fn mark_disputed(&mut self, disputer: Option<String>, at: Option<DateTime<Utc>>) {
        if self.status.is_terminal() {
            return;
        }
        self.status = AssertionStatus::Disputed;
        if disputer.is_some() {
            self.disputer = disputer;
        }
        if at.is_some() {
            self.disputed_at = at;
        }
    }

    /// Any state -> Resolved.
    pub fn mark_resolved(&mut self, at: Option<DateTime<Utc>>, outcome: Option<bool>) {
        self.status = AssertionStatus::Resolved;
        if at.is_some() {
            self.resolved_at = at;
        }
        if outcome.is_some() {
            self.settlement_resolution = outcome;
        }
    }
}
