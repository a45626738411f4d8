// ABOUTME: Text-message composition and dispatch engine for prepaid SMS/LMS/MMS gateways
// ABOUTME: Classifies text by provider byte size, prices it in points and sends it page by page

pub mod billing;
pub mod codec;
pub mod config;
pub mod datatypes;
pub mod dispatch;
pub mod history;


// Re-export codec functions for direct access
pub use codec::{CodecError, byte_length, split};

// Re-export the main dispatch API for easy access
pub use billing::{BalanceGuard, CostModel, CostQuote, LowBalanceThreshold, RateTable};
pub use config::{ConfigError, EngineConfig};
pub use datatypes::{
    BalanceSnapshot, BalanceVerdict, Classifier, Message, MessageClass, MessageClassification,
    Recipient, classify,
};
pub use dispatch::{
    CancelHandle, ComposeSession, DispatchError, DispatchOutcome, DispatchProgress,
    DispatchResult, DispatchSequencer, GatewayError, GatewayResult, SendMeta, SequencerBuilder,
    SmsGateway,
};
pub use history::{HistoryRecord, HistoryStore, MemoryHistory};

/// Error returned by the demo and other top-level glue.
///
/// Library operations return the specific error enums (`DispatchError`,
/// `ConfigError`, ...); this boxed type is for code that mixes several.
pub type Error = Box<dyn std::error::Error + Send + Sync>;

/// A specialized `Result` type for top-level glue.
///
/// # Examples
///
/// ## Classifying a draft
///
/// ```rust
/// use sms_dispatch::{CostModel, MessageClass, classify};
///
/// let classification = classify(&"가".repeat(1500));
/// assert_eq!(classification.byte_length, 3000);
/// assert_eq!(classification.class, MessageClass::Lms);
/// assert_eq!(classification.page_count, 2);
///
/// let quote = CostModel::default().quote(&classification, 10);
/// assert_eq!(quote.total_points, 80);
/// ```
///
/// ## Sending with a custom gateway
///
/// ```rust
/// use sms_dispatch::dispatch::NoProgress;
/// use sms_dispatch::{GatewayResult, Message, Recipient, SendMeta, SequencerBuilder, SmsGateway};
/// use std::time::Duration;
///
/// struct EchoGateway;
///
/// impl SmsGateway for EchoGateway {
///     async fn send(&mut self, page: &str, to: &[Recipient], meta: &SendMeta) -> GatewayResult<String> {
///         println!("page {} of {} to {} recipient(s): {}", meta.page_index + 1, meta.total_pages, to.len(), page);
///         Ok(format!("{}-{}", meta.job_tag, meta.page_index))
///     }
/// }
///
/// #[tokio::main]
/// async fn main() -> sms_dispatch::Result<()> {
///     let mut sequencer = SequencerBuilder::new(EchoGateway)
///         .inter_page_delay(Duration::ZERO)
///         .build();
///
///     let recipients = vec![Recipient::new("010-1234-5678"), Recipient::new("010-8765-4321")];
///     let outcome = sequencer
///         .dispatch(&Message::new("Hello, World!"), &recipients, &mut NoProgress)
///         .await?;
///
///     assert!(outcome.is_complete_success());
///     Ok(())
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;
