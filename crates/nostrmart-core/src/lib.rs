//! # NostrMart Core
//!
//! Pure primitives for NostrMart: Nostr events, canonical hashing, Schnorr
//! signatures and public key encodings.
//!
//! This crate contains no I/O, no storage, no networking. It is pure
//! computation over signed event data.
//!
//! ## Key Types
//!
//! - [`Event`] - A signed Nostr event in wire form
//! - [`EventId`] - SHA-256 of the event's canonical serialization
//! - [`PublicKey`] / [`Keypair`] - BIP-340 x-only keys over secp256k1
//! - [`EventBuilder`] - Builds and signs events
//!
//! ## Canonicalization
//!
//! Event ids hash a compact JSON array of the identity-bearing fields. See
//! the [`canonical`] module.
//!
//! ## Usage
//!
//! ```rust
//! use nostrmart_core::{kinds, verify_event, EventBuilder, Keypair};
//!
//! let keypair = Keypair::generate();
//! let event = EventBuilder::new(kinds::TEXT_NOTE)
//!     .content("hello")
//!     .sign(&keypair);
//!
//! assert!(verify_event(&event));
//! ```

pub mod canonical;
pub mod crypto;
pub mod error;
pub mod event;
pub mod keys;
pub mod types;
pub mod verify;

pub use canonical::{compute_event_id, serialize_for_id, EventFields};
pub use crypto::{sha256_hex, Keypair, PublicKey, Sha256Hash, Signature};
pub use error::{CoreError, KeyError, Result, VerifyError};
pub use event::{
    kinds, unix_now, Event, EventBuilder, Tag, DEFAULT_MAX_CONTENT_BYTES, MAX_FUTURE_SKEW_SECS,
};
pub use keys::{
    decode_npub, encode_npub, hex_to_npub, is_valid_hex_pubkey, is_valid_npub, npub_to_hex,
};
pub use types::EventId;
pub use verify::{verify_event, verify_event_detailed};
