// ABOUTME: Error types for dispatch jobs, gateway calls and recipient directory lookups
// ABOUTME: Separates structural job failures from per-page gateway failures that are only recorded

use crate::codec::CodecError;
use crate::datatypes::RecipientError;
use thiserror::Error;

/// Failure reported by the gateway client or the balance source
///
/// During a dispatch these never abort the job; they are stored in the
/// page's [`PageResult`](crate::dispatch::PageResult).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The gateway accepted the request but refused to deliver it
    #[error("Gateway rejected request ({code}): {reason}")]
    Rejected { code: String, reason: String },

    /// The request did not reach the gateway or the reply was unreadable
    #[error("Gateway transport error: {0}")]
    Transport(String),

    /// The gateway did not answer in time
    #[error("Gateway timeout")]
    Timeout,
}

/// Result type alias for gateway and balance source operations
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Structural failure of a dispatch job or compose action
///
/// Any of these means nothing was sent.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Caller-correctable input problem (empty message, no recipients, cap exceeded)
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// A recipient phone number is malformed
    #[error("Invalid recipient: {0}")]
    InvalidRecipient(#[from] RecipientError),

    /// Chunked pages failed the lossless / budget check
    #[error("Classification invariant violated: {0}")]
    Invariant(#[from] CodecError),

    /// The balance does not cover the quote
    #[error("{0}")]
    InsufficientBalance(String),

    /// A send is already running for this compose session
    #[error("A dispatch is already in progress")]
    JobInFlight,

    /// Job moved in a direction its state machine does not allow
    #[error("Invalid job state: {0}")]
    InvalidState(String),

    /// Balance could not be fetched
    #[error("Balance unavailable: {0}")]
    Balance(#[from] GatewayError),
}

/// Result type alias for dispatch operations
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Errors from recipient directory lookups
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    /// No contact group with that name
    #[error("Unknown contact group: {0}")]
    UnknownGroup(String),

    /// The group holds a malformed entry
    #[error("Invalid recipient in group {group}: {source}")]
    InvalidRecipient {
        group: String,
        #[source]
        source: RecipientError,
    },
}

/// Result type alias for directory lookups
pub type DirectoryResult<T> = Result<T, DirectoryError>;
