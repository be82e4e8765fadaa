// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Configuration constants.

/// Prefix joined with an assertion id to form its dispute id.
pub const DISPUTE_ID_PREFIX: &str = "D:";

/// Weight applied to a vote that does not carry one.
pub const DEFAULT_VOTE_WEIGHT: u128 = 1;

/// Chain label used when neither the payload nor a related record names one.
pub const UNKNOWN_CHAIN: &str = "unknown";

/// Length of a hex-encoded BLAKE3 digest.
pub const CHECKSUM_HEX_LEN: usize = 64;
