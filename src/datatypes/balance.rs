// ABOUTME: Prepaid account balance snapshot and the verdict produced when gating a send
// ABOUTME: Snapshots carry their fetch time so caches can decide when they are stale

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account balance as last reported by the balance source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    /// Prepaid message points
    pub point_balance: u64,
    /// Cash balance in the smallest currency unit
    pub cash_balance: u64,
    /// When the balance was fetched
    pub fetched_at: DateTime<Utc>,
}

impl BalanceSnapshot {
    /// Snapshot stamped with the current time
    pub fn new(point_balance: u64, cash_balance: u64) -> Self {
        Self {
            point_balance,
            cash_balance,
            fetched_at: Utc::now(),
        }
    }

    /// Override the fetch time
    pub fn fetched_at(mut self, at: DateTime<Utc>) -> Self {
        self.fetched_at = at;
        self
    }
}

/// Coarse verdict status, derived from [`BalanceVerdict`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerdictStatus {
    Sufficient,
    Warning,
    Insufficient,
}

/// Result of checking a quote against a balance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceVerdict {
    /// The balance covers the quote
    pub sufficient: bool,
    /// The balance covers the quote but will be low afterwards
    pub warning: bool,
    /// Human-readable explanation for warnings and shortfalls
    pub message: Option<String>,
}

impl BalanceVerdict {
    pub fn sufficient() -> Self {
        Self {
            sufficient: true,
            warning: false,
            message: None,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            sufficient: true,
            warning: true,
            message: Some(message.into()),
        }
    }

    pub fn insufficient(message: impl Into<String>) -> Self {
        Self {
            sufficient: false,
            warning: false,
            message: Some(message.into()),
        }
    }

    pub fn status(&self) -> VerdictStatus {
        match (self.sufficient, self.warning) {
            (false, _) => VerdictStatus::Insufficient,
            (true, true) => VerdictStatus::Warning,
            (true, false) => VerdictStatus::Sufficient,
        }
    }

    /// True if a send may start
    pub fn allows_send(&self) -> bool {
        self.sufficient
    }
}
