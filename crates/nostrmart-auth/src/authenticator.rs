//! Authenticator: issues challenges and validates signed responses.
//!
//! Per session the lifecycle is `NoChallenge -> Issued -> {Consumed | Expired}`.
//! A response is a kind-22242 event, signed by the client, carrying the
//! issued value in a `["challenge", <value>]` tag.

use std::time::Duration;

use nostrmart_core::{kinds, unix_now, verify_event_detailed, Event};
use rand::rngs::OsRng;
use rand::RngCore;
use tracing::{debug, warn};

use crate::error::{ChallengeError, Result};
use crate::store::{Challenge, ChallengeStore};

/// Configuration for the authenticator.
#[derive(Debug, Clone)]
pub struct AuthenticatorConfig {
    /// How long an issued challenge stays valid.
    pub challenge_ttl: Duration,
    /// Maximum distance between an event's `created_at` and now.
    pub timestamp_window: Duration,
}

impl Default for AuthenticatorConfig {
    fn default() -> Self {
        Self {
            challenge_ttl: Duration::from_secs(300),
            timestamp_window: Duration::from_secs(300),
        }
    }
}

/// Challenge-response authenticator over an injected store.
pub struct Authenticator<S: ChallengeStore> {
    store: S,
    config: AuthenticatorConfig,
}

impl<S: ChallengeStore> Authenticator<S> {
    /// Create an authenticator with default configuration.
    pub fn new(store: S) -> Self {
        Self::with_config(store, AuthenticatorConfig::default())
    }

    /// Create an authenticator with custom configuration.
    pub fn with_config(store: S, config: AuthenticatorConfig) -> Self {
        Self { store, config }
    }

    /// Get a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get the configuration.
    pub fn config(&self) -> &AuthenticatorConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Issuance
    // ─────────────────────────────────────────────────────────────────────────

    /// Issue a fresh challenge for a session.
    ///
    /// Any prior challenge for the same session stops being valid.
    pub async fn issue_challenge(&self, session_key: &str) -> Result<String> {
        self.issue_challenge_at(session_key, unix_now()).await
    }

    /// Issue a challenge with an explicit issuance time.
    pub async fn issue_challenge_at(&self, session_key: &str, now: u64) -> Result<String> {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        let value = hex::encode(bytes);

        let replaced = self
            .store
            .put(Challenge {
                value: value.clone(),
                session_key: session_key.to_string(),
                issued_at: now,
            })
            .await?;

        debug!(
            session = session_key,
            replaced = replaced.is_some(),
            "Issued challenge"
        );
        Ok(value)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Validation
    // ─────────────────────────────────────────────────────────────────────────

    /// Validate an authentication event against the session's challenge.
    ///
    /// Does not consume the challenge; call [`Authenticator::consume`] after
    /// the login is accepted, or use [`Authenticator::validate_and_consume`].
    pub async fn validate(&self, session_key: &str, event: &Event) -> Result<()> {
        self.validate_at(session_key, event, unix_now()).await
    }

    /// Validate with an explicit current time.
    pub async fn validate_at(&self, session_key: &str, event: &Event, now: u64) -> Result<()> {
        self.check(session_key, event, now).await.map(|_| ())
    }

    /// Validate and, on success, consume the challenge in one step.
    ///
    /// Of several concurrent calls presenting the same challenge, at most one
    /// succeeds; the rest see `NoChallengeFound`.
    pub async fn validate_and_consume(&self, session_key: &str, event: &Event) -> Result<()> {
        self.validate_and_consume_at(session_key, event, unix_now())
            .await
    }

    /// Validate and consume with an explicit current time.
    pub async fn validate_and_consume_at(
        &self,
        session_key: &str,
        event: &Event,
        now: u64,
    ) -> Result<()> {
        let challenge = self.check(session_key, event, now).await?;

        if !self
            .store
            .remove_if_value(session_key, &challenge.value)
            .await?
        {
            warn!(session = session_key, "Challenge consumed concurrently");
            return Err(ChallengeError::NoChallengeFound);
        }

        debug!(session = session_key, pubkey = %event.pubkey, "Authenticated");
        Ok(())
    }

    /// Delete the session's challenge, if any.
    pub async fn consume(&self, session_key: &str) -> Result<()> {
        self.store.remove(session_key).await?;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Maintenance
    // ─────────────────────────────────────────────────────────────────────────

    /// Remove all expired challenges. Returns how many were removed.
    pub async fn purge_expired(&self) -> Result<usize> {
        self.purge_expired_at(unix_now()).await
    }

    /// Remove challenges expired as of `now`.
    pub async fn purge_expired_at(&self, now: u64) -> Result<usize> {
        let cutoff = now.saturating_sub(self.config.challenge_ttl.as_secs());
        let removed = self.store.remove_issued_before(cutoff).await?;
        if removed > 0 {
            debug!(removed, "Purged expired challenges");
        }
        Ok(removed)
    }

    /// Run the checks in order and return the matched challenge.
    async fn check(&self, session_key: &str, event: &Event, now: u64) -> Result<Challenge> {
        let result = self.check_inner(session_key, event, now).await;
        if let Err(ref e) = result {
            warn!(session = session_key, error = %e, "Authentication rejected");
        }
        result
    }

    async fn check_inner(&self, session_key: &str, event: &Event, now: u64) -> Result<Challenge> {
        // 1. A challenge must be live for this session
        let challenge = self
            .store
            .get(session_key)
            .await?
            .ok_or(ChallengeError::NoChallengeFound)?;

        // 2. Expired challenges are deleted on sight
        if challenge.is_expired(now, self.config.challenge_ttl.as_secs()) {
            self.store
                .remove_if_value(session_key, &challenge.value)
                .await?;
            return Err(ChallengeError::ChallengeExpired);
        }

        // 3. Must be an authentication event
        if event.kind != kinds::CLIENT_AUTH {
            return Err(ChallengeError::WrongKind {
                expected: kinds::CLIENT_AUTH,
                actual: event.kind,
            });
        }

        // 4. Timestamp must be close to now, in either direction
        let window = self.config.timestamp_window.as_secs();
        if now.abs_diff(event.created_at) > window {
            return Err(ChallengeError::TimestampOutOfWindow {
                created_at: event.created_at,
                now,
                window,
            });
        }

        // 5. Must echo the stored challenge
        let echoed = event
            .tags_named("challenge")
            .any(|t| t.value() == Some(challenge.value.as_str()));
        if !echoed {
            return Err(ChallengeError::ChallengeTagMissing);
        }

        // 6. Id and signature
        verify_event_detailed(event).map_err(ChallengeError::InvalidSignature)?;

        Ok(challenge)
    }
}
