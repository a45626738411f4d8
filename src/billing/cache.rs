// ABOUTME: Pull-based balance cache refreshed on demand and invalidated after each send
// ABOUTME: Tracks staleness, refresh counts and consecutive fetch failures for the balance source

use crate::datatypes::BalanceSnapshot;
use crate::dispatch::{BalanceSource, GatewayResult};
use chrono::Utc;
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration for the balance cache
///
/// # Example
///
/// ```rust
/// use sms_dispatch::billing::BalanceCacheConfig;
/// use std::time::Duration;
///
/// // Only refresh when asked to, or after a send
/// let config = BalanceCacheConfig::default();
///
/// // Also treat snapshots older than five minutes as stale
/// let config = BalanceCacheConfig::default()
///     .with_max_age(Duration::from_secs(300));
/// ```
#[derive(Debug, Clone)]
pub struct BalanceCacheConfig {
    /// Age after which a snapshot is considered stale (default: never)
    pub max_age: Option<Duration>,

    /// Invalidate the snapshot when a dispatch finishes (default: true)
    pub refresh_after_send: bool,
}

impl Default for BalanceCacheConfig {
    fn default() -> Self {
        Self {
            max_age: None,
            refresh_after_send: true,
        }
    }
}

impl BalanceCacheConfig {
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    pub fn with_refresh_after_send(mut self, refresh: bool) -> Self {
        self.refresh_after_send = refresh;
        self
    }
}

/// Snapshot of cache health
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceCacheStatus {
    /// A snapshot is held
    pub has_snapshot: bool,
    /// The snapshot should be refreshed before it is trusted
    pub stale: bool,
    /// Successful refreshes since creation
    pub total_refreshes: u32,
    /// Failed refreshes in a row
    pub consecutive_failures: u32,
}

/// Process-local cache of the account balance
///
/// The cache never fetches on its own. Callers pull a fresh snapshot with
/// [`refresh`](Self::refresh), typically on a manual "refresh balance"
/// action or after a dispatch, and use [`should_refresh`](Self::should_refresh)
/// to decide when that is needed. During a long multi-page job the snapshot
/// is not updated, so it does not reflect points consumed mid-job.
#[derive(Debug, Default)]
pub struct BalanceCache {
    config: BalanceCacheConfig,
    snapshot: Option<BalanceSnapshot>,
    invalidated: bool,
    total_refreshes: u32,
    consecutive_failures: u32,
}

impl BalanceCache {
    pub fn new(config: BalanceCacheConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Last fetched snapshot, stale or not
    pub fn snapshot(&self) -> Option<&BalanceSnapshot> {
        self.snapshot.as_ref()
    }

    /// True if there is no snapshot, it was invalidated, or it is older than `max_age`
    pub fn should_refresh(&self) -> bool {
        let Some(snapshot) = &self.snapshot else {
            return true;
        };
        if self.invalidated {
            return true;
        }
        match self.config.max_age {
            Some(max_age) => {
                let age = Utc::now().signed_duration_since(snapshot.fetched_at);
                age.to_std().is_ok_and(|age| age >= max_age)
            }
            None => false,
        }
    }

    /// Fetch a new snapshot from `source`
    ///
    /// On failure the previous snapshot is kept and stays flagged for refresh.
    pub async fn refresh<S: BalanceSource>(&mut self, source: &S) -> GatewayResult<BalanceSnapshot> {
        match source.fetch_balance().await {
            Ok(snapshot) => {
                self.total_refreshes += 1;
                self.consecutive_failures = 0;
                self.invalidated = false;
                debug!(
                    "Balance refreshed: {} points, {} cash",
                    snapshot.point_balance, snapshot.cash_balance
                );
                self.snapshot = Some(snapshot.clone());
                Ok(snapshot)
            }
            Err(e) => {
                self.consecutive_failures += 1;
                warn!(
                    "Balance refresh failed (consecutive failures: {}): {}",
                    self.consecutive_failures, e
                );
                Err(e)
            }
        }
    }

    /// Refresh only if [`should_refresh`](Self::should_refresh) says so
    pub async fn ensure_fresh<S: BalanceSource>(&mut self, source: &S) -> GatewayResult<BalanceSnapshot> {
        if !self.should_refresh() {
            if let Some(snapshot) = &self.snapshot {
                return Ok(snapshot.clone());
            }
        }
        self.refresh(source).await
    }

    /// Mark the snapshot stale without dropping it
    pub fn invalidate(&mut self) {
        self.invalidated = true;
    }

    /// Hook for the end of a dispatch
    pub fn on_dispatch_finished(&mut self) {
        if self.config.refresh_after_send {
            self.invalidate();
        }
    }

    pub fn status(&self) -> BalanceCacheStatus {
        BalanceCacheStatus {
            has_snapshot: self.snapshot.is_some(),
            stale: self.should_refresh(),
            total_refreshes: self.total_refreshes,
            consecutive_failures: self.consecutive_failures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::GatewayError;
    use std::cell::{Cell, RefCell};

    /// Balance source replaying a script of responses
    struct ScriptedSource {
        responses: RefCell<Vec<GatewayResult<BalanceSnapshot>>>,
        fetches: Cell<u32>,
    }

    impl ScriptedSource {
        fn new(mut responses: Vec<GatewayResult<BalanceSnapshot>>) -> Self {
            responses.reverse();
            Self {
                responses: RefCell::new(responses),
                fetches: Cell::new(0),
            }
        }
    }

    impl BalanceSource for ScriptedSource {
        async fn fetch_balance(&self) -> GatewayResult<BalanceSnapshot> {
            self.fetches.set(self.fetches.get() + 1);
            self.responses
                .borrow_mut()
                .pop()
                .unwrap_or(Err(GatewayError::Timeout))
        }
    }

    #[tokio::test]
    async fn test_empty_cache_needs_refresh() {
        let mut cache = BalanceCache::default();
        assert!(cache.should_refresh());
        assert!(cache.snapshot().is_none());

        let source = ScriptedSource::new(vec![Ok(BalanceSnapshot::new(120, 5000))]);
        let snapshot = cache.refresh(&source).await.unwrap();
        assert_eq!(snapshot.point_balance, 120);
        assert!(!cache.should_refresh());
        assert_eq!(cache.status().total_refreshes, 1);
    }

    #[tokio::test]
    async fn test_invalidate_after_send() {
        let mut cache = BalanceCache::default();
        let source = ScriptedSource::new(vec![
            Ok(BalanceSnapshot::new(100, 0)),
            Ok(BalanceSnapshot::new(92, 0)),
        ]);
        cache.refresh(&source).await.unwrap();

        // snapshot kept but flagged
        cache.on_dispatch_finished();
        assert!(cache.should_refresh());
        assert_eq!(cache.snapshot().unwrap().point_balance, 100);

        let snapshot = cache.ensure_fresh(&source).await.unwrap();
        assert_eq!(snapshot.point_balance, 92);
        assert!(!cache.should_refresh());
    }

    #[tokio::test]
    async fn test_refresh_after_send_can_be_disabled() {
        let mut cache = BalanceCache::new(BalanceCacheConfig::default().with_refresh_after_send(false));
        let source = ScriptedSource::new(vec![Ok(BalanceSnapshot::new(10, 0))]);
        cache.refresh(&source).await.unwrap();
        cache.on_dispatch_finished();
        assert!(!cache.should_refresh());
    }

    #[tokio::test]
    async fn test_ensure_fresh_skips_fetch_when_fresh() {
        let mut cache = BalanceCache::default();
        let source = ScriptedSource::new(vec![Ok(BalanceSnapshot::new(10, 0))]);
        cache.ensure_fresh(&source).await.unwrap();
        cache.ensure_fresh(&source).await.unwrap();
        assert_eq!(source.fetches.get(), 1);
    }

    #[tokio::test]
    async fn test_old_snapshot_is_stale() {
        let mut cache = BalanceCache::new(BalanceCacheConfig::default().with_max_age(Duration::from_secs(60)));
        let old = BalanceSnapshot::new(10, 0).fetched_at(Utc::now() - chrono::Duration::seconds(120));
        let source = ScriptedSource::new(vec![Ok(old)]);
        cache.refresh(&source).await.unwrap();
        assert!(cache.should_refresh());
        assert!(cache.status().stale);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_snapshot() {
        let mut cache = BalanceCache::default();
        let source = ScriptedSource::new(vec![
            Ok(BalanceSnapshot::new(50, 0)),
            Err(GatewayError::Transport("connection reset".to_string())),
        ]);
        cache.refresh(&source).await.unwrap();
        cache.invalidate();

        assert!(cache.refresh(&source).await.is_err());
        assert_eq!(cache.snapshot().unwrap().point_balance, 50);
        let status = cache.status();
        assert_eq!(status.consecutive_failures, 1);
        assert!(status.stale);
    }
}
