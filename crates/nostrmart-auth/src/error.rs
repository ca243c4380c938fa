//! Error types for challenge-response authentication.

use nostrmart_core::VerifyError;
use thiserror::Error;

/// Errors from a challenge store backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The backend could not be reached.
    #[error("challenge store unavailable: {0}")]
    Unavailable(String),

    /// The backend rejected or failed the operation.
    #[error("challenge store error: {0}")]
    Backend(String),
}

/// Reasons an authentication event is rejected.
///
/// Variants are listed in the order the checks run; the first failing check
/// wins.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChallengeError {
    /// No live challenge was issued for this session.
    #[error("no challenge found for session")]
    NoChallengeFound,

    /// The challenge outlived its time-to-live. It has been deleted.
    #[error("challenge expired")]
    ChallengeExpired,

    /// The event is not an authentication event.
    #[error("wrong event kind: expected {expected}, got {actual}")]
    WrongKind { expected: u16, actual: u16 },

    /// The event's `created_at` is too far from the current time.
    #[error("event timestamp {created_at} outside window of {window}s around {now}")]
    TimestampOutOfWindow {
        created_at: u64,
        now: u64,
        window: u64,
    },

    /// The event carries no `challenge` tag matching the stored value.
    #[error("challenge tag missing or does not match")]
    ChallengeTagMissing,

    /// The event failed id or signature verification.
    #[error("invalid signature: {0}")]
    InvalidSignature(#[source] VerifyError),

    /// The challenge store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for authentication operations.
pub type Result<T> = std::result::Result<T, ChallengeError>;
