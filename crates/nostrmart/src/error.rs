//! Error types for the NostrMart facade.

use nostrmart_auth::ChallengeError;
use nostrmart_blob::BlobError;
use nostrmart_core::{CoreError, KeyError, VerifyError};
use thiserror::Error;

use crate::media::MediaError;
use crate::store::StoreError;

/// Errors that can occur during facade operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Event failed structural checks.
    #[error("malformed event: {0}")]
    Event(#[from] CoreError),

    /// Event failed verification.
    #[error("verification failed: {0}")]
    Verify(#[from] VerifyError),

    /// Public key text could not be decoded.
    #[error("invalid key: {0}")]
    Key(#[from] KeyError),

    /// Login answer was rejected.
    #[error("challenge rejected: {0}")]
    Challenge(#[from] ChallengeError),

    /// Blob operation failed.
    #[error("blob error: {0}")]
    Blob(#[from] BlobError),

    /// Backing store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Upload was rejected before reaching a blob server.
    #[error("media rejected: {0}")]
    Media(#[from] MediaError),

    /// The operation needs a backing store and none is configured.
    #[error("no backing store configured")]
    StoreNotConfigured,
}

/// Client-safe classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    MalformedInput,
    IntegrityMismatch,
    CryptoVerificationFailed,
    ChallengeInvalid,
    ServerUnavailable,
    Internal,
}

impl ErrorCategory {
    /// Generic message safe to show to remote clients.
    pub fn public_message(self) -> &'static str {
        match self {
            ErrorCategory::MalformedInput => "invalid request",
            ErrorCategory::IntegrityMismatch => "event id does not match content",
            ErrorCategory::CryptoVerificationFailed => "invalid signature",
            ErrorCategory::ChallengeInvalid => "authentication failed",
            ErrorCategory::ServerUnavailable => "service temporarily unavailable",
            ErrorCategory::Internal => "internal error",
        }
    }

    /// Matching HTTP status code.
    pub fn status_code(self) -> u16 {
        match self {
            ErrorCategory::MalformedInput | ErrorCategory::IntegrityMismatch => 400,
            ErrorCategory::CryptoVerificationFailed | ErrorCategory::ChallengeInvalid => 401,
            ErrorCategory::ServerUnavailable => 503,
            ErrorCategory::Internal => 500,
        }
    }
}

impl Error {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Event(_) | Error::Key(_) | Error::Media(_) => ErrorCategory::MalformedInput,
            Error::Verify(e) => match e {
                VerifyError::Malformed(_) => ErrorCategory::MalformedInput,
                VerifyError::IdMismatch { .. } => ErrorCategory::IntegrityMismatch,
                VerifyError::SignatureFailed => ErrorCategory::CryptoVerificationFailed,
            },
            Error::Challenge(ChallengeError::Store(_)) => ErrorCategory::ServerUnavailable,
            Error::Challenge(_) => ErrorCategory::ChallengeInvalid,
            Error::Blob(e) => match e {
                BlobError::MalformedInput(_) | BlobError::Authorization(_) => {
                    ErrorCategory::MalformedInput
                }
                BlobError::AllServersUnreachable { .. } => ErrorCategory::ServerUnavailable,
                BlobError::Client(_) => ErrorCategory::Internal,
            },
            Error::Store(e) if e.is_transient() => ErrorCategory::ServerUnavailable,
            Error::Store(_) | Error::StoreNotConfigured => ErrorCategory::Internal,
        }
    }

    /// Generic message for this error; never includes the underlying detail.
    pub fn public_message(&self) -> &'static str {
        self.category().public_message()
    }
}

/// Result type for facade operations.
pub type Result<T> = std::result::Result<T, Error>;
