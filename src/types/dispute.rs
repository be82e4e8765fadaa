// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::DisputeStatus;
use super::id::dispute_id_for;
use crate::tally::VoteTally;

/// Current view of the contest of one assertion.
///
/// Vote counters are only ever written from a full [`VoteTally`]; nothing
/// increments them in place.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dispute {
    pub id: String,
    pub assertion_id: String,
    pub chain: String,
    pub disputer: Option<String>,
    pub status: DisputeStatus,
    #[serde(with = "crate::types::amount")]
    pub current_votes_for: u128,
    #[serde(with = "crate::types::amount")]
    pub current_votes_against: u128,
    #[serde(with = "crate::types::amount")]
    pub total_votes: u128,
    pub disputed_at: Option<DateTime<Utc>>,
    pub voting_ends_at: Option<DateTime<Utc>>,
}

impl Dispute {
    /// A new dispute in `Voting` with zero tallies, keyed from the assertion.
    pub fn open(assertion_id: impl Into<String>, chain: impl Into<String>) -> Self {
        let assertion_id = assertion_id.into();
        Self {
            id: dispute_id_for(&assertion_id),
            assertion_id,
            chain: chain.into(),
            disputer: None,
            status: DisputeStatus::Voting,
            current_votes_for: 0,
            current_votes_against: 0,
            total_votes: 0,
            disputed_at: None,
            voting_ends_at: None,
        }
    }

    pub fn tally(&self) -> VoteTally {
        VoteTally {
            votes_for: self.current_votes_for,
            votes_against: self.current_votes_against,
            total: self.total_votes,
        }
    }

    /// Overwrite all three counters from a recomputed tally.
    pub fn set_tally(&mut self, tally: VoteTally) {
        self.current_votes_for = tally.votes_for;
        self.current_votes_against = tally.votes_against;
        self.total_votes = tally.total;
    }

    /// Any state -> Executed. Voting closes at the resolution time when known.
    pub fn mark_executed(&mut self, at: Option<DateTime<Utc>>) {
        self.status = DisputeStatus::Executed;
        if at.is_some() {
            self.voting_ends_at = at;
        }
    }
}
