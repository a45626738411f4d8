// ABOUTME: Inter-page pacing and cooperative cancellation for sequential multi-page sends
// ABOUTME: The delay is an injectable dependency so tests can run the sequencer without wall-clock waits

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::debug;

/// Default pause between two pages of the same job
pub const DEFAULT_INTER_PAGE_DELAY: Duration = Duration::from_millis(500);

/// Waits between pages
///
/// The pause is a courtesy to the gateway's per-account rate limit, not a
/// correctness requirement, so implementations are free to skip it.
pub trait Pacer {
    async fn pause(&self, delay: Duration);
}

/// Sleeps on the tokio timer
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioPacer;

impl Pacer for TokioPacer {
    async fn pause(&self, delay: Duration) {
        if delay.is_zero() {
            return;
        }
        debug!("Pausing {:?} before next page", delay);
        tokio::time::sleep(delay).await;
    }
}

/// Returns immediately
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDelay;

impl Pacer for NoDelay {
    async fn pause(&self, _delay: Duration) {}
}

/// Cooperative cancellation flag shared between a caller and a running job
///
/// The sequencer checks the flag before each page's gateway call. Pages
/// already handed to the gateway are not recalled.
///
/// # Example
///
/// ```rust
/// use sms_dispatch::dispatch::CancelHandle;
///
/// let handle = CancelHandle::new();
/// let for_ui = handle.clone();
///
/// assert!(!handle.is_cancelled());
/// for_ui.cancel();
/// assert!(handle.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; remaining pages will not be sent
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_tokio_pacer_waits() {
        let started = std::time::Instant::now();
        TokioPacer.pause(Duration::from_millis(20)).await;
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[tokio::test]
    async fn test_zero_delay_returns_immediately() {
        TokioPacer.pause(Duration::ZERO).await;
        NoDelay.pause(Duration::from_secs(3600)).await;
    }

    #[test]
    fn test_cancel_is_shared_between_clones() {
        let handle = CancelHandle::new();
        let other = handle.clone();
        other.cancel();
        assert!(handle.is_cancelled());
        assert!(!CancelHandle::default().is_cancelled());
    }
}
