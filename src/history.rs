// ABOUTME: Sent-message history built from finished dispatch outcomes
// ABOUTME: Records carry class labels, delivery status and the points actually charged, with filtering and usage totals

use crate::billing::CostModel;
use crate::datatypes::{Message, MessageClass};
use crate::dispatch::DispatchOutcome;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Characters of message text kept in a record
pub const PREVIEW_CHARS: usize = 40;

/// How much of a job reached the recipients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeliveryStatus {
    /// Every page was sent
    Delivered,
    /// Some pages were sent
    Partial,
    /// Nothing was sent
    Failed,
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DeliveryStatus::Delivered => "delivered",
            DeliveryStatus::Partial => "partial",
            DeliveryStatus::Failed => "failed",
        })
    }
}

/// One finished send
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub job_tag: String,
    pub sent_at: DateTime<Utc>,
    pub class: MessageClass,
    /// Leading characters of the message text
    pub preview: String,
    pub recipient_count: usize,
    pub total_pages: usize,
    pub success_pages: usize,
    pub failed_pages: usize,
    pub cancelled: bool,
    /// Points for the pages that actually went out
    pub points_charged: u64,
}

impl HistoryRecord {
    /// Build a record from a finished dispatch
    ///
    /// Only successfully sent pages are charged.
    pub fn from_outcome(
        outcome: &DispatchOutcome,
        message: &Message,
        recipient_count: usize,
        cost_model: &CostModel,
    ) -> Self {
        let per_recipient = cost_model.points_for_pages(outcome.class, outcome.success_pages);
        Self {
            job_tag: outcome.job_tag.clone(),
            sent_at: Utc::now(),
            class: outcome.class,
            preview: preview(&message.text),
            recipient_count,
            total_pages: outcome.total_pages,
            success_pages: outcome.success_pages,
            failed_pages: outcome.failed_pages,
            cancelled: outcome.cancelled,
            points_charged: per_recipient.saturating_mul(recipient_count as u64),
        }
    }

    /// Override the send time
    pub fn sent_at(mut self, at: DateTime<Utc>) -> Self {
        self.sent_at = at;
        self
    }

    pub fn status(&self) -> DeliveryStatus {
        if self.success_pages == 0 {
            DeliveryStatus::Failed
        } else if self.success_pages == self.total_pages {
            DeliveryStatus::Delivered
        } else {
            DeliveryStatus::Partial
        }
    }

    /// Class label as shown in a history list, e.g. `LMS (3 pages)`
    pub fn label(&self) -> String {
        if self.class == MessageClass::Lms && self.total_pages > 1 {
            format!("{} ({} pages)", self.class.label(), self.total_pages)
        } else {
            self.class.label().to_string()
        }
    }
}

fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

/// Criteria for listing records; unset fields match everything
#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    pub class: Option<MessageClass>,
    pub status: Option<DeliveryStatus>,
    pub since: Option<DateTime<Utc>>,
}

impl HistoryFilter {
    pub fn class(mut self, class: MessageClass) -> Self {
        self.class = Some(class);
        self
    }

    pub fn status(mut self, status: DeliveryStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn matches(&self, record: &HistoryRecord) -> bool {
        self.class.is_none_or(|class| record.class == class)
            && self.status.is_none_or(|status| record.status() == status)
            && self.since.is_none_or(|since| record.sent_at >= since)
    }
}

/// Totals over a set of records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UsageSummary {
    pub jobs: usize,
    pub pages_sent: usize,
    pub pages_failed: usize,
    pub points_spent: u64,
}

impl UsageSummary {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a HistoryRecord>) -> Self {
        records
            .into_iter()
            .fold(UsageSummary::default(), |mut acc, record| {
                acc.jobs += 1;
                acc.pages_sent += record.success_pages;
                acc.pages_failed += record.failed_pages;
                acc.points_spent = acc.points_spent.saturating_add(record.points_charged);
                acc
            })
    }
}

/// Append-only store of history records
pub trait HistoryStore {
    fn append(&mut self, record: HistoryRecord);

    /// All records, oldest first
    fn records(&self) -> &[HistoryRecord];

    /// Records matching `filter`, newest first
    fn query(&self, filter: &HistoryFilter) -> Vec<&HistoryRecord> {
        self.records()
            .iter()
            .rev()
            .filter(|record| filter.matches(record))
            .collect()
    }

    fn usage(&self, filter: &HistoryFilter) -> UsageSummary {
        UsageSummary::from_records(self.query(filter))
    }
}

/// History kept in a vector for the lifetime of the process
#[derive(Debug, Clone, Default)]
pub struct MemoryHistory {
    records: Vec<HistoryRecord>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl HistoryStore for MemoryHistory {
    fn append(&mut self, record: HistoryRecord) {
        self.records.push(record);
    }

    fn records(&self) -> &[HistoryRecord] {
        &self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::PageResult;

    fn outcome(class: MessageClass, results: &[bool]) -> DispatchOutcome {
        let page_results: Vec<PageResult> = results
            .iter()
            .enumerate()
            .map(|(i, ok)| {
                if *ok {
                    PageResult::sent(i, format!("m{}", i))
                } else {
                    PageResult::failed(i, "rejected")
                }
            })
            .collect();
        let success_pages = results.iter().filter(|ok| **ok).count();
        DispatchOutcome {
            job_tag: "job-1".to_string(),
            class,
            total_pages: results.len(),
            overall_success: success_pages > 0,
            success_pages,
            failed_pages: results.len() - success_pages,
            cancelled: false,
            page_results,
        }
    }

    #[test]
    fn test_points_charged_for_sent_pages_only() {
        let record = HistoryRecord::from_outcome(
            &outcome(MessageClass::Lms, &[true, false, true]),
            &Message::new("x".repeat(5000)),
            10,
            &CostModel::default(),
        );
        assert_eq!(record.points_charged, 80);
        assert_eq!(record.status(), DeliveryStatus::Partial);
        assert_eq!(record.label(), "LMS (3 pages)");
    }

    #[test]
    fn test_mms_charged_flat() {
        let record = HistoryRecord::from_outcome(
            &outcome(MessageClass::Mms, &[true]),
            &Message::mms("photo"),
            3,
            &CostModel::default(),
        );
        assert_eq!(record.points_charged, 45);
        assert_eq!(record.label(), "MMS");
    }

    #[test]
    fn test_failed_job_charges_nothing() {
        let record = HistoryRecord::from_outcome(
            &outcome(MessageClass::Sms, &[false]),
            &Message::new("hi"),
            4,
            &CostModel::default(),
        );
        assert_eq!(record.points_charged, 0);
        assert_eq!(record.status(), DeliveryStatus::Failed);
        assert_eq!(record.label(), "SMS");
    }

    #[test]
    fn test_preview_truncates_by_chars() {
        assert_eq!(preview("short"), "short");
        let long = "가".repeat(50);
        let p = preview(&long);
        assert_eq!(p.chars().count(), PREVIEW_CHARS + 3);
        assert!(p.ends_with("..."));
    }

    #[test]
    fn test_query_and_usage() {
        let model = CostModel::default();
        let mut history = MemoryHistory::new();
        let old = Utc::now() - chrono::Duration::days(2);

        history.append(
            HistoryRecord::from_outcome(&outcome(MessageClass::Sms, &[true]), &Message::new("a"), 2, &model)
                .sent_at(old),
        );
        history.append(HistoryRecord::from_outcome(
            &outcome(MessageClass::Lms, &[true, true]),
            &Message::new("b"),
            1,
            &model,
        ));
        history.append(HistoryRecord::from_outcome(
            &outcome(MessageClass::Lms, &[false]),
            &Message::new("c"),
            1,
            &model,
        ));
        assert_eq!(history.len(), 3);

        let lms = history.query(&HistoryFilter::default().class(MessageClass::Lms));
        assert_eq!(lms.len(), 2);
        assert_eq!(lms[0].preview, "c");

        let delivered = history.query(&HistoryFilter::default().status(DeliveryStatus::Delivered));
        assert_eq!(delivered.len(), 2);

        let recent = HistoryFilter::default().since(Utc::now() - chrono::Duration::days(1));
        assert_eq!(history.query(&recent).len(), 2);

        let usage = history.usage(&HistoryFilter::default());
        assert_eq!(
            usage,
            UsageSummary {
                jobs: 3,
                pages_sent: 3,
                pages_failed: 1,
                points_spent: 2 + 8,
            }
        );
    }
}
