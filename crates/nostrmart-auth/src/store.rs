//! ChallengeStore trait: where issued challenges live between requests.
//!
//! The authenticator never touches storage directly. A process-local map is
//! provided in [`crate::memory`]; a shared external store (for deployments
//! with several workers) implements the same trait.

use async_trait::async_trait;

use crate::error::StoreError;

/// A challenge issued to one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    /// 32 random bytes, lowercase hex.
    pub value: String,
    /// Opaque key identifying the session.
    pub session_key: String,
    /// Unix seconds at issuance.
    pub issued_at: u64,
}

impl Challenge {
    /// Whether the challenge has outlived `ttl_secs` at time `now`.
    pub fn is_expired(&self, now: u64, ttl_secs: u64) -> bool {
        now.saturating_sub(self.issued_at) > ttl_secs
    }
}

/// Async storage for live challenges, at most one per session key.
///
/// Implementations must make each method atomic with respect to a single
/// session key. Different session keys must not block each other.
#[async_trait]
pub trait ChallengeStore: Send + Sync {
    /// Store a challenge, replacing any prior one for the same session.
    ///
    /// Returns the replaced challenge, if any.
    async fn put(&self, challenge: Challenge) -> Result<Option<Challenge>, StoreError>;

    /// Get the live challenge for a session.
    async fn get(&self, session_key: &str) -> Result<Option<Challenge>, StoreError>;

    /// Remove the challenge for a session, whatever its value.
    async fn remove(&self, session_key: &str) -> Result<Option<Challenge>, StoreError>;

    /// Remove the challenge for a session only if it still holds `value`.
    ///
    /// Returns `true` if this call removed it. Used to consume a validated
    /// challenge without clobbering one issued in the meantime.
    async fn remove_if_value(&self, session_key: &str, value: &str) -> Result<bool, StoreError>;

    /// Remove every challenge issued before `cutoff`. Returns how many.
    async fn remove_issued_before(&self, cutoff: u64) -> Result<usize, StoreError>;

    /// Number of live entries.
    async fn len(&self) -> Result<usize, StoreError>;
}
