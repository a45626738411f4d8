// ABOUTME: Point pricing of classified messages per recipient and for a whole recipient batch
// ABOUTME: LMS pages are billed one by one while MMS is billed at a flat rate regardless of size

use crate::datatypes::{MessageClass, MessageClassification};
use serde::Deserialize;

/// Points charged per page of each class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RateTable {
    /// Points per SMS
    pub sms: u64,
    /// Points per LMS page
    pub lms: u64,
    /// Flat points per MMS
    pub mms: u64,
}

impl Default for RateTable {
    fn default() -> Self {
        Self {
            sms: 1,
            lms: 4,
            mms: 15,
        }
    }
}

/// Price of a send
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CostQuote {
    /// Points charged for each recipient
    pub per_recipient_points: u64,
    /// Number of recipients
    pub recipient_count: usize,
    /// `per_recipient_points * recipient_count`
    pub total_points: u64,
}

/// Maps message shape and recipient count to points
#[derive(Debug, Clone, Copy, Default)]
pub struct CostModel {
    rates: RateTable,
}

impl CostModel {
    pub fn new(rates: RateTable) -> Self {
        Self { rates }
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    /// Points for delivering `pages` pages of `class` to one recipient
    ///
    /// MMS is a single flat-rate unit; any non-zero page count costs the MMS rate.
    pub fn points_for_pages(&self, class: MessageClass, pages: usize) -> u64 {
        if pages == 0 {
            return 0;
        }
        match class {
            MessageClass::Sms => self.rates.sms.saturating_mul(pages as u64),
            MessageClass::Lms => self.rates.lms.saturating_mul(pages as u64),
            MessageClass::Mms => self.rates.mms,
        }
    }

    /// Quote a classified message for `recipient_count` recipients
    pub fn quote(&self, classification: &MessageClassification, recipient_count: usize) -> CostQuote {
        let per_recipient_points =
            self.points_for_pages(classification.class, classification.page_count);
        CostQuote {
            per_recipient_points,
            recipient_count,
            total_points: per_recipient_points.saturating_mul(recipient_count as u64),
        }
    }
}
