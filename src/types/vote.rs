// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use serde::{Deserialize, Serialize};

/// One cast vote, exactly as observed on chain. Never updated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteEvent {
    pub chain: String,
    pub assertion_id: String,
    pub voter: String,
    pub support: bool,
    #[serde(with = "crate::types::amount")]
    pub weight: u128,
    pub tx_hash: String,
    pub block_number: u64,
    pub log_index: u32,
}

impl VoteEvent {
    /// Identity of the on-chain log that produced this vote.
    ///
    /// Two deliveries of the same log share this key; two distinct votes
    /// never do.
    pub fn identity(&self) -> (u64, u32, &str) {
        (self.block_number, self.log_index, self.tx_hash.as_str())
    }
}
