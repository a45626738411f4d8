// ABOUTME: Compose session holding the draft text, selected recipients and cached balance
// ABOUTME: Re-classifies on every edit and gates sends on balance before handing off to the sequencer

use crate::billing::{BalanceCache, BalanceCacheConfig, BalanceCacheStatus, BalanceGuard, CostModel, CostQuote};
use crate::config::EngineConfig;
use crate::datatypes::{
    BalanceSnapshot, BalanceVerdict, Classifier, Message, MessageClassification, Recipient,
    dedupe_recipients,
};
use crate::dispatch::error::{DirectoryResult, DispatchError, DispatchResult, GatewayResult};
use crate::dispatch::pacing::{CancelHandle, Pacer};
use crate::dispatch::sequencer::DispatchSequencer;
use crate::dispatch::traits::{BalanceSource, ProgressSink, RecipientDirectory, SmsGateway};
use crate::dispatch::types::DispatchOutcome;
use tracing::{debug, info, warn};

/// Everything a send needs, captured when the send begins
#[derive(Debug, Clone)]
pub struct PendingSend {
    pub message: Message,
    pub recipients: Vec<Recipient>,
    pub quote: CostQuote,
    pub verdict: BalanceVerdict,
}

/// Draft state behind a compose screen
///
/// Every text edit re-classifies the draft, so the byte counter, class
/// label and cost estimate are always current. Sending goes through
/// [`begin_send`](Self::begin_send) and [`finish_send`](Self::finish_send);
/// between the two the session refuses to start another send.
#[derive(Debug, Default)]
pub struct ComposeSession {
    text: String,
    mms: bool,
    recipients: Vec<Recipient>,
    classifier: Classifier,
    cost_model: CostModel,
    guard: BalanceGuard,
    balance: BalanceCache,
    classification: MessageClassification,
    in_flight: bool,
}

impl ComposeSession {
    pub fn new(
        classifier: Classifier,
        cost_model: CostModel,
        guard: BalanceGuard,
        cache_config: BalanceCacheConfig,
    ) -> Self {
        Self {
            classifier,
            cost_model,
            guard,
            balance: BalanceCache::new(cache_config),
            ..Default::default()
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            config.classifier(),
            config.cost_model(),
            config.balance_guard(),
            config.balance_cache_config(),
        )
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn recipients(&self) -> &[Recipient] {
        &self.recipients
    }

    pub fn is_mms(&self) -> bool {
        self.mms
    }

    pub fn is_sending(&self) -> bool {
        self.in_flight
    }

    /// Replace the draft text
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text == self.text {
            return;
        }
        self.text = text;
        self.reclassify();
    }

    /// Switch between the MMS class and size-based classification
    pub fn set_mms(&mut self, mms: bool) {
        if mms == self.mms {
            return;
        }
        self.mms = mms;
        self.reclassify();
    }

    pub fn set_recipients(&mut self, recipients: Vec<Recipient>) {
        self.recipients = dedupe_recipients(recipients);
    }

    /// Append recipients, skipping phones already selected
    ///
    /// Returns how many were actually added.
    pub fn add_recipients(&mut self, recipients: impl IntoIterator<Item = Recipient>) -> usize {
        let before = self.recipients.len();
        let mut merged = std::mem::take(&mut self.recipients);
        merged.extend(recipients);
        self.recipients = dedupe_recipients(merged);
        self.recipients.len() - before
    }

    /// Append the members of a directory group
    pub async fn add_group<D: RecipientDirectory>(
        &mut self,
        directory: &D,
        group: &str,
    ) -> DirectoryResult<usize> {
        let members = directory.resolve(group).await?;
        let added = self.add_recipients(members);
        debug!("Added {} recipient(s) from group {}", added, group);
        Ok(added)
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.recipients.clear();
        self.reclassify();
    }

    /// Classification of the current draft
    pub fn classification(&self) -> &MessageClassification {
        &self.classification
    }

    /// Cost of sending the current draft to the current recipients
    pub fn quote(&self) -> CostQuote {
        self.cost_model
            .quote(&self.classification, self.recipients.len())
    }

    /// Balance check for the current draft, if a balance has been fetched
    pub fn verdict(&self) -> Option<BalanceVerdict> {
        self.balance
            .snapshot()
            .map(|snapshot| self.guard.evaluate(&self.quote(), snapshot))
    }

    pub fn balance(&self) -> Option<&BalanceSnapshot> {
        self.balance.snapshot()
    }

    pub fn balance_status(&self) -> BalanceCacheStatus {
        self.balance.status()
    }

    /// Fetch a new balance unconditionally
    pub async fn refresh_balance<S: BalanceSource>(&mut self, source: &S) -> GatewayResult<BalanceSnapshot> {
        self.balance.refresh(source).await
    }

    /// Fetch a new balance only if the cached one is missing or stale
    pub async fn ensure_balance<S: BalanceSource>(&mut self, source: &S) -> GatewayResult<BalanceSnapshot> {
        self.balance.ensure_fresh(source).await
    }

    /// Check the draft and mark the session busy
    ///
    /// Fails if another send is in progress, the draft is empty, or the
    /// balance is unknown, stale or does not cover the quote. The balance
    /// goes stale after every send, so consecutive sends need a refresh in
    /// between. A low-balance warning does not block; it is carried in the
    /// returned verdict.
    pub fn begin_send(&mut self) -> DispatchResult<PendingSend> {
        if self.in_flight {
            return Err(DispatchError::JobInFlight);
        }

        let message = Message {
            text: self.text.clone(),
            mms: self.mms,
        };
        if message.is_blank() {
            return Err(DispatchError::Precondition("message is empty".to_string()));
        }
        if self.recipients.is_empty() {
            return Err(DispatchError::Precondition("no recipients selected".to_string()));
        }

        if self.balance.snapshot().is_some() && self.balance.should_refresh() {
            return Err(DispatchError::Precondition(
                "balance is stale, refresh before sending".to_string(),
            ));
        }

        let quote = self.quote();
        let verdict = self
            .verdict()
            .ok_or_else(|| DispatchError::Precondition("balance has not been fetched".to_string()))?;
        if !verdict.allows_send() {
            let reason = verdict
                .message
                .unwrap_or_else(|| "Insufficient balance".to_string());
            return Err(DispatchError::InsufficientBalance(reason));
        }
        if let Some(warning) = verdict.message.as_deref().filter(|_| verdict.warning) {
            warn!("{}", warning);
        }

        self.in_flight = true;
        Ok(PendingSend {
            message,
            recipients: self.recipients.clone(),
            quote,
            verdict,
        })
    }

    /// Release the session after a send and apply its outcome
    ///
    /// The draft is cleared if any page went out and kept otherwise, so a
    /// fully failed send can be retried as is.
    pub fn finish_send(&mut self, outcome: &DispatchOutcome) {
        self.in_flight = false;
        self.balance.on_dispatch_finished();
        if outcome.overall_success {
            self.clear();
        }
    }

    /// Release the session after a send that never started
    pub fn abort_send(&mut self) {
        self.in_flight = false;
    }

    /// Send the draft through `sequencer`
    ///
    /// The sequencer must split the draft exactly as quoted; if its limits
    /// produce different pages, nothing is sent.
    pub async fn send<G, P, S>(
        &mut self,
        sequencer: &mut DispatchSequencer<G, P>,
        progress: &mut S,
        cancel: &CancelHandle,
    ) -> DispatchResult<DispatchOutcome>
    where
        G: SmsGateway,
        P: Pacer,
        S: ProgressSink,
    {
        let pending = self.begin_send()?;
        info!(
            "Sending draft: {} to {} recipient(s), {} point(s)",
            self.classification.class,
            pending.recipients.len(),
            pending.quote.total_points
        );

        let job = match sequencer.prepare(&pending.message, &pending.recipients) {
            Ok(job) if job.classification() == &self.classification => job,
            Ok(job) => {
                self.abort_send();
                return Err(DispatchError::Precondition(format!(
                    "sequencer splits the draft into {} page(s), quoted for {}",
                    job.total_pages(),
                    self.classification.page_count
                )));
            }
            Err(e) => {
                self.abort_send();
                return Err(e);
            }
        };

        match sequencer.run(job, progress, cancel).await {
            Ok(outcome) => {
                self.finish_send(&outcome);
                Ok(outcome)
            }
            Err(e) => {
                self.abort_send();
                Err(e)
            }
        }
    }

    fn reclassify(&mut self) {
        let message = Message {
            text: self.text.clone(),
            mms: self.mms,
        };
        self.classification = self.classifier.classify_message(&message);
    }
}
