// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Lifecycle enums.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::KernelError;

/// Pending -> Disputed -> Resolved. Resolved is terminal; Pending may also
/// resolve directly when nobody disputes within liveness.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssertionStatus {
    Pending,
    Disputed,
    Resolved,
}

impl AssertionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssertionStatus::Pending => "pending",
            AssertionStatus::Disputed => "disputed",
            AssertionStatus::Resolved => "resolved",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AssertionStatus::Resolved)
    }
}

impl Default for AssertionStatus {
    fn default() -> Self {
        AssertionStatus::Pending
    }
}

impl FromStr for AssertionStatus {
    type Err = KernelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(AssertionStatus::Pending),
            "disputed" => Ok(AssertionStatus::Disputed),
            "resolved" => Ok(AssertionStatus::Resolved),
            other => Err(KernelError::InvalidStatus(other.to_string())),
        }
    }
}

impl fmt::Display for AssertionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Voting -> PendingExecution -> Executed. Executed is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisputeStatus {
    Voting,
    PendingExecution,
    Executed,
}

impl DisputeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisputeStatus::Voting => "voting",
            DisputeStatus::PendingExecution => "pending_execution",
            DisputeStatus::Executed => "executed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, DisputeStatus::Executed)
    }
}

impl Default for DisputeStatus {
    fn default() -> Self {
        DisputeStatus::Voting
    }
}

impl FromStr for DisputeStatus {
    type Err = KernelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "voting" => Ok(DisputeStatus::Voting),
            "pending_execution" => Ok(DisputeStatus::PendingExecution),
            "executed" => Ok(DisputeStatus::Executed),
            other => Err(KernelError::InvalidStatus(other.to_string())),
        }
    }
}

impl fmt::Display for DisputeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
