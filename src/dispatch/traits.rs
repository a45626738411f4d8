// ABOUTME: Narrow interfaces to the collaborators around the dispatch engine
// ABOUTME: Gateway client, balance source, recipient directory and progress sink, using native async traits

use crate::datatypes::{BalanceSnapshot, Recipient};
use crate::dispatch::error::{DirectoryResult, GatewayResult};
use crate::dispatch::types::{DispatchProgress, SendMeta};
use tokio::sync::mpsc::UnboundedSender;

/// Outbound gateway client
///
/// The only I/O boundary of a dispatch. One call delivers one page to the
/// whole recipient batch; any fan-out happens inside the gateway. Retries
/// and backoff, if any, are the implementation's business: the sequencer
/// records a failed call and moves on.
pub trait SmsGateway {
    /// Send one page to every recipient
    ///
    /// Returns the message id assigned by the gateway.
    async fn send(
        &mut self,
        page_text: &str,
        recipients: &[Recipient],
        meta: &SendMeta,
    ) -> GatewayResult<String>;
}

/// Source of the prepaid account balance
pub trait BalanceSource {
    /// Fetch the current balance
    async fn fetch_balance(&self) -> GatewayResult<BalanceSnapshot>;
}

/// Read-only lookup of stored contact lists
///
/// The engine resolves groups into recipients but never writes back.
pub trait RecipientDirectory {
    /// Resolve a named contact group into recipients
    async fn resolve(&self, group: &str) -> DirectoryResult<Vec<Recipient>>;
}

/// Receiver of progress events while a job is in flight
pub trait ProgressSink {
    fn on_progress(&mut self, progress: DispatchProgress);
}

impl<F> ProgressSink for F
where
    F: FnMut(DispatchProgress),
{
    fn on_progress(&mut self, progress: DispatchProgress) {
        self(progress)
    }
}

/// Discards all progress events
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_progress(&mut self, _progress: DispatchProgress) {}
}

/// Forwards progress events over a tokio channel
///
/// Useful when progress is rendered by another task. A closed receiver is
/// ignored; the dispatch carries on.
#[derive(Debug, Clone)]
pub struct ChannelProgress {
    sender: UnboundedSender<DispatchProgress>,
}

impl ChannelProgress {
    pub fn new(sender: UnboundedSender<DispatchProgress>) -> Self {
        Self { sender }
    }
}

impl ProgressSink for ChannelProgress {
    fn on_progress(&mut self, progress: DispatchProgress) {
        let _ = self.sender.send(progress);
    }
}
