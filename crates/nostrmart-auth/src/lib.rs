//! # NostrMart Auth
//!
//! Replay-protected challenge/response login over signed Nostr events.
//!
//! ## Overview
//!
//! A server issues a random challenge per session. The client answers with a
//! kind-22242 event that echoes the challenge in a `challenge` tag and is
//! signed by the key it wants to log in as. The [`Authenticator`] checks the
//! answer against the stored challenge and the event's own signature.
//!
//! ## Key Types
//!
//! - [`Authenticator`] - Issues, validates and consumes challenges
//! - [`ChallengeStore`] - The async trait for challenge storage
//! - [`MemoryChallengeStore`] - Sharded in-process store
//! - [`ChallengeError`] - Why a login was rejected
//!
//! ## Usage
//!
//! ```rust,no_run
//! use nostrmart_auth::{Authenticator, MemoryChallengeStore};
//! use nostrmart_core::{EventBuilder, Keypair};
//!
//! async fn example() {
//!     let auth = Authenticator::new(MemoryChallengeStore::new());
//!
//!     let challenge = auth.issue_challenge("session-1").await.unwrap();
//!
//!     // Client side
//!     let keypair = Keypair::generate();
//!     let event = EventBuilder::auth(&challenge, None).sign(&keypair);
//!
//!     auth.validate_and_consume("session-1", &event).await.unwrap();
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Single live challenge**: issuing again for a session replaces the old value
//! - **Expiry**: challenges older than five minutes are rejected and deleted
//! - **Injected storage**: the authenticator holds its store, no globals

pub mod authenticator;
pub mod error;
pub mod memory;
pub mod store;

pub use authenticator::{Authenticator, AuthenticatorConfig};
pub use error::{ChallengeError, Result, StoreError};
pub use memory::MemoryChallengeStore;
pub use store::{Challenge, ChallengeStore};
