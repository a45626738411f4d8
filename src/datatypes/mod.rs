mod balance;
mod classification;
mod message_class;
mod recipient;

pub use balance::{BalanceSnapshot, BalanceVerdict, VerdictStatus};
pub use classification::{Classifier, Message, MessageClassification, classify};
pub use message_class::{LMS_PAGE_MAX_BYTES, MessageClass, SMS_MAX_BYTES};
pub use recipient::{
    MAX_PHONE_DIGITS, MIN_PHONE_DIGITS, Recipient, RecipientError, dedupe_recipients,
};
