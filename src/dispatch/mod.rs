// ABOUTME: Dispatch module turning a classified message into an ordered series of gateway sends
// ABOUTME: Exports the sequencer, compose session, collaborator traits, job types and error types

//! Message Dispatch Module
//!
//! This module drives a message from a compose screen to the gateway:
//!
//! * **Native async traits** - Collaborators (`SmsGateway`, `BalanceSource`,
//!   `RecipientDirectory`) use async fn in traits, no async_trait dependency
//! * **One job at a time** - `DispatchSequencer` sends pages strictly in order,
//!   one batched gateway call per page, pausing between pages
//! * **Partial failure** - A failed page is recorded and the next page is still sent
//! * **Cancellation** - `CancelHandle` stops a job between pages
//! * **Progress** - Any `FnMut(DispatchProgress)`, a tokio channel, or nothing
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sms_dispatch::datatypes::{Message, Recipient};
//! use sms_dispatch::dispatch::{DispatchProgress, DispatchSequencer, GatewayResult, SendMeta, SmsGateway};
//!
//! struct HttpGateway;
//!
//! impl SmsGateway for HttpGateway {
//!     async fn send(&mut self, page: &str, to: &[Recipient], meta: &SendMeta) -> GatewayResult<String> {
//!         // POST the page to the provider here
//!         Ok(format!("{}-{}", meta.job_tag, meta.page_index))
//!     }
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut sequencer = DispatchSequencer::new(HttpGateway);
//! let recipients = vec![Recipient::new("010-1234-5678")];
//!
//! let outcome = sequencer
//!     .dispatch(&Message::new("Hello!"), &recipients, &mut |p: DispatchProgress| {
//!         println!("{}", p.status);
//!     })
//!     .await?;
//! println!("{}", outcome);
//! # Ok(())
//! # }
//! ```
//!
//! ## Compose Sessions
//!
//! `ComposeSession` keeps the draft, re-classifies it on every edit and
//! refuses to send when the cached balance does not cover the quote:
//!
//! ```rust,no_run
//! # use sms_dispatch::dispatch::*;
//! # use sms_dispatch::datatypes::{BalanceSnapshot, Recipient};
//! # async fn example<G: SmsGateway, B: BalanceSource>(gateway: G, source: B) -> Result<(), Box<dyn std::error::Error>> {
//! let mut session = ComposeSession::default();
//! session.set_text("Meeting moved to 3pm");
//! session.set_recipients(vec![Recipient::new("010-1234-5678")]);
//! session.refresh_balance(&source).await?;
//!
//! let mut sequencer = DispatchSequencer::new(gateway);
//! let outcome = session
//!     .send(&mut sequencer, &mut NoProgress, &CancelHandle::new())
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod compose;
pub mod directory;
pub mod error;
pub mod pacing;
pub mod sequencer;
pub mod traits;
pub mod types;

// Re-export the main types for easy access
pub use builder::SequencerBuilder;
pub use compose::{ComposeSession, PendingSend};
pub use directory::InMemoryDirectory;
pub use error::{
    DirectoryError, DirectoryResult, DispatchError, DispatchResult, GatewayError, GatewayResult,
};
pub use pacing::{CancelHandle, DEFAULT_INTER_PAGE_DELAY, NoDelay, Pacer, TokioPacer};
pub use sequencer::{DEFAULT_MAX_RECIPIENTS, DispatchSequencer, SequencerOptions};
pub use traits::{
    BalanceSource, ChannelProgress, NoProgress, ProgressSink, RecipientDirectory, SmsGateway,
};
pub use types::{
    CANCELLED_PAGE_ERROR, DispatchJob, DispatchOutcome, DispatchProgress, JobState, PageResult,
    SendMeta,
};
