// ABOUTME: Dispatch job state machine, per-page results and the terminal outcome summary
// ABOUTME: Jobs only move forward from idle through in-progress to completed or failed

use crate::datatypes::{Message, MessageClass, MessageClassification, Recipient};
use crate::dispatch::error::{DispatchError, DispatchResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Metadata attached to every gateway call
///
/// Lets history records reconstruct which page of which job a gateway
/// message belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendMeta {
    /// Zero-based page index
    pub page_index: usize,
    /// Total pages in the job
    pub total_pages: usize,
    /// Tag shared by all pages of one job
    pub job_tag: String,
    /// Billing class of the message
    pub class: MessageClass,
}

/// Progress event emitted before each page is sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchProgress {
    /// One-based page number being sent
    pub page: usize,
    /// Total pages in the job
    pub total_pages: usize,
    /// Human-readable status line
    pub status: String,
}

/// Lifecycle state of a [`DispatchJob`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Idle,
    InProgress,
    Completed,
    Failed,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }
}

/// Outcome of sending one page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResult {
    /// Zero-based page index
    pub page_index: usize,
    /// The gateway accepted the page
    pub success: bool,
    /// Failure reason when `success` is false
    pub error: Option<String>,
    /// Gateway message id when `success` is true
    pub gateway_message_id: Option<String>,
}

impl PageResult {
    pub fn sent(page_index: usize, gateway_message_id: impl Into<String>) -> Self {
        Self {
            page_index,
            success: true,
            error: None,
            gateway_message_id: Some(gateway_message_id.into()),
        }
    }

    pub fn failed(page_index: usize, error: impl Into<String>) -> Self {
        Self {
            page_index,
            success: false,
            error: Some(error.into()),
            gateway_message_id: None,
        }
    }
}

/// Error recorded for pages skipped after cancellation
pub const CANCELLED_PAGE_ERROR: &str = "cancelled before send";

/// Terminal summary of a dispatch job
///
/// This, not the job, is what gets handed to history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchOutcome {
    /// Tag shared by all gateway calls of the job
    pub job_tag: String,
    /// Billing class of the message
    pub class: MessageClass,
    /// Pages in the job
    pub total_pages: usize,
    /// At least one page reached the recipients
    pub overall_success: bool,
    /// Pages accepted by the gateway
    pub success_pages: usize,
    /// Pages that failed or were never attempted
    pub failed_pages: usize,
    /// The job was cancelled before all pages were attempted
    pub cancelled: bool,
    /// One entry per page, in page order
    pub page_results: Vec<PageResult>,
}

impl DispatchOutcome {
    /// Every page went out
    pub fn is_complete_success(&self) -> bool {
        self.total_pages > 0 && self.success_pages == self.total_pages
    }

    /// State the job ended in
    pub fn final_state(&self) -> JobState {
        if self.overall_success {
            JobState::Completed
        } else {
            JobState::Failed
        }
    }

    /// "X/N pages sent" or "X/N pages sent (Y failed)"
    pub fn summary(&self) -> String {
        if self.failed_pages == 0 {
            format!("{}/{} pages sent", self.success_pages, self.total_pages)
        } else {
            format!(
                "{}/{} pages sent ({} failed)",
                self.success_pages, self.total_pages, self.failed_pages
            )
        }
    }
}

impl fmt::Display for DispatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())?;
        if self.cancelled {
            f.write_str(", cancelled")?;
        }
        Ok(())
    }
}

/// The unit of work for one send
///
/// A job is created per send, driven forward by the sequencer and consumed
/// by [`DispatchJob::finish`]. It cannot be restarted.
#[derive(Debug)]
pub struct DispatchJob {
    job_tag: String,
    message: Message,
    recipients: Vec<Recipient>,
    classification: MessageClassification,
    state: JobState,
    current_page_index: usize,
    page_results: Vec<PageResult>,
}

impl DispatchJob {
    pub fn new(
        message: Message,
        recipients: Vec<Recipient>,
        classification: MessageClassification,
    ) -> Self {
        Self {
            job_tag: Uuid::new_v4().to_string(),
            message,
            recipients,
            classification,
            state: JobState::Idle,
            current_page_index: 0,
            page_results: Vec::new(),
        }
    }

    pub fn job_tag(&self) -> &str {
        &self.job_tag
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn recipients(&self) -> &[Recipient] {
        &self.recipients
    }

    pub fn classification(&self) -> &MessageClassification {
        &self.classification
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn current_page_index(&self) -> usize {
        self.current_page_index
    }

    pub fn total_pages(&self) -> usize {
        self.classification.page_count
    }

    pub fn page_results(&self) -> &[PageResult] {
        &self.page_results
    }

    /// Gateway metadata for `page_index`
    pub fn meta(&self, page_index: usize) -> SendMeta {
        SendMeta {
            page_index,
            total_pages: self.total_pages(),
            job_tag: self.job_tag.clone(),
            class: self.classification.class,
        }
    }

    /// Idle -> InProgress
    pub fn start(&mut self) -> DispatchResult<()> {
        if self.state != JobState::Idle {
            return Err(DispatchError::InvalidState(format!(
                "cannot start job in state {:?}",
                self.state
            )));
        }
        self.state = JobState::InProgress;
        Ok(())
    }

    /// Move to `page_index`; the index never goes backwards
    pub fn advance(&mut self, page_index: usize) -> DispatchResult<()> {
        if self.state != JobState::InProgress {
            return Err(DispatchError::InvalidState(format!(
                "cannot advance job in state {:?}",
                self.state
            )));
        }
        if page_index < self.current_page_index || page_index >= self.total_pages() {
            return Err(DispatchError::InvalidState(format!(
                "page index {} out of order (current {}, total {})",
                page_index,
                self.current_page_index,
                self.total_pages()
            )));
        }
        self.current_page_index = page_index;
        Ok(())
    }

    /// Store the result for the next page in order
    pub fn record(&mut self, result: PageResult) -> DispatchResult<()> {
        if self.state != JobState::InProgress {
            return Err(DispatchError::InvalidState(format!(
                "cannot record result in state {:?}",
                self.state
            )));
        }
        if result.page_index != self.page_results.len() {
            return Err(DispatchError::InvalidState(format!(
                "result for page {} recorded out of order, expected {}",
                result.page_index,
                self.page_results.len()
            )));
        }
        self.page_results.push(result);
        Ok(())
    }

    /// Close the job and produce its outcome
    ///
    /// Pages without a recorded result are counted as failed and get a
    /// placeholder result, so a cancelled job still reports every page.
    /// The job ends in `Completed` if any page went out and `Failed` otherwise.
    pub fn finish(&mut self, cancelled: bool) -> DispatchResult<DispatchOutcome> {
        if self.state != JobState::InProgress {
            return Err(DispatchError::InvalidState(format!(
                "cannot finish job in state {:?}",
                self.state
            )));
        }

        let total_pages = self.total_pages();
        for page_index in self.page_results.len()..total_pages {
            self.page_results
                .push(PageResult::failed(page_index, CANCELLED_PAGE_ERROR));
        }

        let success_pages = self.page_results.iter().filter(|r| r.success).count();
        let overall_success = success_pages > 0;
        self.state = if overall_success {
            JobState::Completed
        } else {
            JobState::Failed
        };

        Ok(DispatchOutcome {
            job_tag: self.job_tag.clone(),
            class: self.classification.class,
            total_pages,
            overall_success,
            success_pages,
            failed_pages: total_pages - success_pages,
            cancelled,
            page_results: self.page_results.clone(),
        })
    }
}
