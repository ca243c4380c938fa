//! # NostrMart
//!
//! Verified Nostr events, challenge login and redundant blob storage for a
//! marketplace backend.
//!
//! ## Overview
//!
//! - **Events**: signed Nostr events are checked, verified and stored once
//! - **Login**: clients prove key ownership by signing a server challenge
//! - **Media**: uploads go to the first of several blob servers that accepts
//!   them, and are recorded in the backing store
//!
//! ## Usage
//!
//! ```rust,no_run
//! use nostrmart::{telemetry, NostrMart, Settings};
//! use nostrmart::core::{EventBuilder, Keypair};
//!
//! async fn example() -> anyhow::Result<()> {
//!     let settings = Settings::from_env()?;
//!     telemetry::init(&settings.log_level)?;
//!
//!     let app = NostrMart::connect(&settings)?;
//!
//!     let keypair = Keypair::generate();
//!     let event = EventBuilder::new(1).content("gm").sign(&keypair);
//!     app.events().ingest(&event).await?;
//!
//!     let challenge = app.auth().issue_challenge("session-1").await?;
//!     let answer = EventBuilder::auth(&challenge, None).sign(&keypair);
//!     let pubkey = app.login("session-1", &answer).await?;
//!     assert_eq!(pubkey, keypair.public_key());
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `nostrmart::core` - Events, keys, hashing and verification
//! - `nostrmart::auth` - Challenge-response authentication
//! - `nostrmart::blob` - Blob server client

pub mod app;
pub mod config;
pub mod error;
pub mod events;
pub mod media;
pub mod rest;
pub mod store;
pub mod telemetry;

// Re-export component crates
pub use nostrmart_auth as auth;
pub use nostrmart_blob as blob;
pub use nostrmart_core as core;

pub use app::NostrMart;
pub use config::Settings;
pub use error::{Error, ErrorCategory, Result};
pub use events::{EventService, EventServiceConfig, Ingested};
pub use media::{
    content_type_for, sanitize_filename, MediaConfig, MediaError, MediaService, UploadedMedia,
};
pub use rest::{RestClient, RestConfig};
pub use store::{
    EventQuery, InsertResult, MediaObject, MemoryStore, NewMediaObject, Store, StoreError,
};

pub use nostrmart_core::{Event, EventBuilder, EventId, Keypair, PublicKey};
