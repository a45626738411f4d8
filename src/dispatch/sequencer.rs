// ABOUTME: Sequential dispatch of classified messages to a gateway, one page at a time
// ABOUTME: Records per-page failures without aborting, paces pages, honours cancellation, reports progress

use crate::codec::byte_length;
use crate::datatypes::{Classifier, Message, MessageClass, Recipient};
use crate::dispatch::error::{DispatchError, DispatchResult};
use crate::dispatch::pacing::{CancelHandle, DEFAULT_INTER_PAGE_DELAY, Pacer, TokioPacer};
use crate::dispatch::traits::{ProgressSink, SmsGateway};
use crate::dispatch::types::{DispatchJob, DispatchOutcome, DispatchProgress, PageResult};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default cap on recipients per send
pub const DEFAULT_MAX_RECIPIENTS: usize = 1000;

/// Tunables for a [`DispatchSequencer`]
#[derive(Debug, Clone, Copy)]
pub struct SequencerOptions {
    /// Pause between two pages of the same job
    pub inter_page_delay: Duration,
    /// Largest recipient batch accepted
    pub max_recipients: usize,
    /// Byte limits used to classify and verify pages
    pub classifier: Classifier,
}

impl Default for SequencerOptions {
    fn default() -> Self {
        Self {
            inter_page_delay: DEFAULT_INTER_PAGE_DELAY,
            max_recipients: DEFAULT_MAX_RECIPIENTS,
            classifier: Classifier::default(),
        }
    }
}

/// Drives dispatch jobs against a gateway
///
/// Pages go out strictly in order, each page to the whole recipient batch
/// in a single gateway call, with a pause between pages. A gateway failure
/// is recorded in the page's result and the next page is still attempted;
/// only precondition and invariant violations abort a job, and they do so
/// before anything is sent.
///
/// The sequencer takes `&mut self` per dispatch, so it runs one job at a time.
pub struct DispatchSequencer<G, P = TokioPacer> {
    gateway: G,
    pacer: P,
    options: SequencerOptions,
}

impl<G> DispatchSequencer<G, TokioPacer>
where
    G: SmsGateway,
{
    /// Sequencer with default options, pacing on the tokio timer
    pub fn new(gateway: G) -> Self {
        Self::with_parts(gateway, TokioPacer, SequencerOptions::default())
    }
}

impl<G, P> DispatchSequencer<G, P>
where
    G: SmsGateway,
    P: Pacer,
{
    pub fn with_parts(gateway: G, pacer: P, options: SequencerOptions) -> Self {
        Self {
            gateway,
            pacer,
            options,
        }
    }

    pub fn options(&self) -> &SequencerOptions {
        &self.options
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn gateway_mut(&mut self) -> &mut G {
        &mut self.gateway
    }

    pub fn pacer(&self) -> &P {
        &self.pacer
    }

    /// Check preconditions and build an idle job
    ///
    /// Fails on a blank message, an empty or oversized recipient list, a
    /// malformed recipient phone, an MMS text over the page budget, or pages
    /// that do not reconstitute the text within budget.
    pub fn prepare(&self, message: &Message, recipients: &[Recipient]) -> DispatchResult<DispatchJob> {
        if message.is_blank() {
            return Err(DispatchError::Precondition("message is empty".to_string()));
        }

        if recipients.is_empty() {
            return Err(DispatchError::Precondition("no recipients selected".to_string()));
        }

        if recipients.len() > self.options.max_recipients {
            return Err(DispatchError::Precondition(format!(
                "{} recipients exceeds the limit of {}",
                recipients.len(),
                self.options.max_recipients
            )));
        }

        for recipient in recipients {
            recipient.validate()?;
        }

        let page_max_bytes = self.options.classifier.page_max_bytes;
        if message.mms && byte_length(&message.text) > page_max_bytes {
            return Err(DispatchError::Precondition(format!(
                "MMS text is {} bytes, limit is {}",
                byte_length(&message.text),
                page_max_bytes
            )));
        }

        let classification = self.options.classifier.classify_message(message);
        classification.verify(&message.text, page_max_bytes)?;

        Ok(DispatchJob::new(
            message.clone(),
            recipients.to_vec(),
            classification,
        ))
    }

    /// Send `message` to `recipients`, reporting progress to `progress`
    pub async fn dispatch<S>(
        &mut self,
        message: &Message,
        recipients: &[Recipient],
        progress: &mut S,
    ) -> DispatchResult<DispatchOutcome>
    where
        S: ProgressSink,
    {
        self.dispatch_with_cancel(message, recipients, progress, &CancelHandle::new())
            .await
    }

    /// Like [`dispatch`](Self::dispatch), stopping early once `cancel` is set
    pub async fn dispatch_with_cancel<S>(
        &mut self,
        message: &Message,
        recipients: &[Recipient],
        progress: &mut S,
        cancel: &CancelHandle,
    ) -> DispatchResult<DispatchOutcome>
    where
        S: ProgressSink,
    {
        let job = self.prepare(message, recipients)?;
        self.run(job, progress, cancel).await
    }

    /// Drive a prepared job to its terminal state
    pub async fn run<S>(
        &mut self,
        mut job: DispatchJob,
        progress: &mut S,
        cancel: &CancelHandle,
    ) -> DispatchResult<DispatchOutcome>
    where
        S: ProgressSink,
    {
        job.start()?;

        let total_pages = job.total_pages();
        let recipient_count = job.recipients().len();
        info!(
            "Dispatch {} started: {} {} page(s) to {} recipient(s)",
            job.job_tag(),
            total_pages,
            job.classification().class,
            recipient_count
        );

        let mut cancelled = false;
        for page_index in 0..total_pages {
            if cancel.is_cancelled() {
                warn!(
                    "Dispatch {} cancelled before page {}/{}",
                    job.job_tag(),
                    page_index + 1,
                    total_pages
                );
                cancelled = true;
                break;
            }

            job.advance(page_index)?;
            progress.on_progress(DispatchProgress {
                page: page_index + 1,
                total_pages,
                status: status_text(
                    job.classification().class,
                    page_index,
                    total_pages,
                    recipient_count,
                ),
            });

            let meta = job.meta(page_index);
            let page_text = &job.classification().pages[page_index];
            let result = match self.gateway.send(page_text, job.recipients(), &meta).await {
                Ok(message_id) => {
                    debug!(
                        "Page {}/{} of {} accepted as {}",
                        page_index + 1,
                        total_pages,
                        meta.job_tag,
                        message_id
                    );
                    PageResult::sent(page_index, message_id)
                }
                Err(e) => {
                    warn!(
                        "Page {}/{} of {} failed: {}",
                        page_index + 1,
                        total_pages,
                        meta.job_tag,
                        e
                    );
                    PageResult::failed(page_index, e.to_string())
                }
            };
            job.record(result)?;

            if page_index + 1 < total_pages {
                self.pacer.pause(self.options.inter_page_delay).await;
            }
        }

        let outcome = job.finish(cancelled)?;
        info!(
            "Dispatch {} finished ({:?}): {}",
            outcome.job_tag,
            job.state(),
            outcome
        );
        Ok(outcome)
    }
}

fn status_text(class: MessageClass, page_index: usize, total_pages: usize, recipients: usize) -> String {
    if total_pages > 1 {
        format!(
            "Sending page {}/{} to {} recipient(s)",
            page_index + 1,
            total_pages,
            recipients
        )
    } else {
        format!("Sending {} to {} recipient(s)", class, recipients)
    }
}
