// ABOUTME: Balance gate that compares a cost quote with the cached account balance
// ABOUTME: Yields sufficient, low-balance warning, or insufficient with a readable reason

use crate::billing::cost::CostQuote;
use crate::datatypes::{BalanceSnapshot, BalanceVerdict};
use serde::Deserialize;

/// Floor under which the remaining balance triggers a warning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LowBalanceThreshold {
    /// Warn when fewer than this many points remain
    Points(u64),
    /// Warn when less than this percentage of the current balance remains
    Percent(u8),
}

impl Default for LowBalanceThreshold {
    fn default() -> Self {
        LowBalanceThreshold::Points(100)
    }
}

impl LowBalanceThreshold {
    fn is_low(&self, remaining: u64, balance: u64) -> bool {
        match *self {
            LowBalanceThreshold::Points(floor) => remaining < floor,
            LowBalanceThreshold::Percent(pct) => {
                (remaining as u128) * 100 < (balance as u128) * (pct as u128)
            }
        }
    }
}

/// Pure decision function over a quote and a balance snapshot
#[derive(Debug, Clone, Copy, Default)]
pub struct BalanceGuard {
    threshold: LowBalanceThreshold,
}

impl BalanceGuard {
    pub fn new(threshold: LowBalanceThreshold) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> LowBalanceThreshold {
        self.threshold
    }

    /// Evaluate whether `balance` covers `quote`
    pub fn evaluate(&self, quote: &CostQuote, balance: &BalanceSnapshot) -> BalanceVerdict {
        let have = balance.point_balance;
        let need = quote.total_points;

        if need > have {
            return BalanceVerdict::insufficient(format!(
                "Insufficient balance: need {} points, have {} (short by {})",
                need,
                have,
                need - have
            ));
        }

        let remaining = have - need;
        if self.threshold.is_low(remaining, have) {
            return BalanceVerdict::warning(format!(
                "Low balance: {} points will remain after sending {}",
                remaining, need
            ));
        }

        BalanceVerdict::sufficient()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatypes::VerdictStatus;

    fn quote(total: u64) -> CostQuote {
        CostQuote {
            per_recipient_points: total,
            recipient_count: 1,
            total_points: total,
        }
    }

    #[test]
    fn test_insufficient_names_shortfall() {
        let guard = BalanceGuard::default();
        let verdict = guard.evaluate(&quote(24), &BalanceSnapshot::new(20, 0));
        assert_eq!(verdict.status(), VerdictStatus::Insufficient);
        assert!(!verdict.allows_send());
        let message = verdict.message.unwrap();
        assert!(message.contains("need 24"));
        assert!(message.contains("short by 4"));
    }

    #[test]
    fn test_exact_balance_is_sufficient_but_warns() {
        let guard = BalanceGuard::default();
        let verdict = guard.evaluate(&quote(500), &BalanceSnapshot::new(500, 0));
        assert!(verdict.sufficient);
        assert!(verdict.warning);
        assert_eq!(verdict.status(), VerdictStatus::Warning);
    }

    #[test]
    fn test_sufficient_without_warning() {
        let guard = BalanceGuard::new(LowBalanceThreshold::Points(100));
        let verdict = guard.evaluate(&quote(10), &BalanceSnapshot::new(1000, 0));
        assert_eq!(verdict, BalanceVerdict::sufficient());

        // remaining exactly at the floor does not warn
        let verdict = guard.evaluate(&quote(900), &BalanceSnapshot::new(1000, 0));
        assert_eq!(verdict.status(), VerdictStatus::Sufficient);
        let verdict = guard.evaluate(&quote(901), &BalanceSnapshot::new(1000, 0));
        assert_eq!(verdict.status(), VerdictStatus::Warning);
    }

    #[test]
    fn test_percentage_threshold() {
        let guard = BalanceGuard::new(LowBalanceThreshold::Percent(10));
        let balance = BalanceSnapshot::new(1000, 0);
        assert_eq!(guard.evaluate(&quote(900), &balance).status(), VerdictStatus::Sufficient);
        assert_eq!(guard.evaluate(&quote(901), &balance).status(), VerdictStatus::Warning);
    }

    #[test]
    fn test_insufficient_iff_total_exceeds_balance() {
        let guard = BalanceGuard::new(LowBalanceThreshold::Points(0));
        for balance in [0u64, 1, 7, 50] {
            for total in [0u64, 1, 7, 8, 50, 51] {
                let verdict = guard.evaluate(&quote(total), &BalanceSnapshot::new(balance, 0));
                assert_eq!(!verdict.sufficient, total > balance, "{total} vs {balance}");
            }
        }
    }
}
