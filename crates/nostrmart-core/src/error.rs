//! Error types for NostrMart Core.

use thiserror::Error;

/// Malformed-input errors raised at the event data-model boundary.
///
/// These are rejected before any cryptographic or network work is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("{field}: expected {expected} hex characters, got {actual}")]
    InvalidLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{0}: invalid hex encoding")]
    InvalidHex(&'static str),

    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("invalid secret key")]
    InvalidSecretKey,

    #[error("content is {actual} bytes, maximum is {max}")]
    ContentTooLarge { max: usize, actual: usize },

    #[error("created_at {created_at} is more than {max_skew}s ahead of {now}")]
    TimestampInFuture {
        created_at: u64,
        now: u64,
        max_skew: u64,
    },

    #[error("malformed event: {0}")]
    MalformedEvent(String),
}

/// Reasons an event fails verification.
///
/// Verification never raises; [`crate::verify_event`] collapses these into a
/// boolean. The detailed form exists for logging and rate limiting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    #[error("malformed event: {0}")]
    Malformed(#[from] CoreError),

    #[error("event id mismatch: claimed {claimed}, computed {computed}")]
    IdMismatch { claimed: String, computed: String },

    #[error("signature verification failed")]
    SignatureFailed,
}

/// Errors from the npub key-format codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("expected {expected} characters, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("invalid prefix: expected 'npub', got '{0}'")]
    InvalidPrefix(String),

    #[error("invalid bech32: {0}")]
    InvalidBech32(String),

    #[error("non-canonical encoding")]
    NonCanonical,

    #[error("decoded {0} bytes, expected 32")]
    InvalidPayloadLength(usize),

    #[error("invalid hex public key")]
    InvalidHex,
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
