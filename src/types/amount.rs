// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! On-chain amounts (bonds, vote weights, tallies).
//!
//! Token amounts routinely exceed `u64` and JSON numbers cannot carry them
//! losslessly, so amounts are `u128` in memory and decimal strings on the wire.
//! Producers that emit small amounts as plain JSON numbers are accepted too.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serializer};

use crate::error::{KernelError, KernelResult};

/// Parse an unsigned decimal amount.
pub fn parse_amount(text: &str) -> KernelResult<u128> {
    let trimmed = text.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(KernelError::InvalidAmount(text.to_string()));
    }
    trimmed
        .parse::<u128>()
        .map_err(|_| KernelError::InvalidAmount(text.to_string()))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Number(u64),
    Text(String),
}

impl RawAmount {
    fn into_amount<E: de::Error>(self) -> Result<u128, E> {
        match self {
            RawAmount::Number(n) => Ok(u128::from(n)),
            RawAmount::Text(s) => parse_amount(&s).map_err(E::custom),
        }
    }
}

pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_string())
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
    RawAmount::deserialize(deserializer)?.into_amount()
}

/// `#[serde(with = "amount::option")]` for optional amounts.
pub mod option {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<u128>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.serialize_some(&v.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u128>, D::Error> {
        match Option::<RawAmount>::deserialize(deserializer)? {
            Some(raw) => raw.into_amount().map(Some),
            None => Ok(None),
        }
    }
}
