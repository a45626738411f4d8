// ABOUTME: Billing module pricing messages in points and gating sends on the account balance
// ABOUTME: Exports the cost model, the balance guard and the pull-based balance cache

mod cache;
mod cost;
mod guard;

pub use cache::{BalanceCache, BalanceCacheConfig, BalanceCacheStatus};
pub use cost::{CostModel, CostQuote, RateTable};
pub use guard::{BalanceGuard, LowBalanceThreshold};
