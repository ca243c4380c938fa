//! Error types for the blob client.

use nostrmart_core::CoreError;
use reqwest::StatusCode;
use thiserror::Error;

/// Errors surfaced by [`crate::BlobClient`] operations.
///
/// Per-server failures are absorbed and logged; callers only see
/// [`BlobError::AllServersUnreachable`] once every server has failed.
#[derive(Debug, Error)]
pub enum BlobError {
    /// Caller input was rejected before any request was made.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// The authorization event could not be encoded.
    #[error("authorization encoding failed: {0}")]
    Authorization(#[from] CoreError),

    /// Every configured server failed the operation.
    #[error("{operation}: all {attempts} servers failed")]
    AllServersUnreachable {
        operation: &'static str,
        attempts: usize,
    },

    /// The HTTP client could not be built.
    #[error("http client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Why a single server attempt failed. Logged, never returned.
#[derive(Debug, Error)]
pub enum AttemptError {
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(StatusCode),

    #[error("hash mismatch: expected {expected}, got {actual}")]
    IntegrityMismatch { expected: String, actual: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Result type for blob operations.
pub type Result<T> = std::result::Result<T, BlobError>;
