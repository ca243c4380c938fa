//! # NostrMart Blob
//!
//! Client for content-addressed blob servers (the Blossom protocol).
//!
//! ## Overview
//!
//! Blobs are identified by the SHA-256 of their bytes. The [`BlobClient`]
//! talks to an ordered list of independent servers: reads and uploads fall
//! over from one server to the next until one succeeds, while listing and
//! deletion visit every server. Fetched bytes are always re-hashed before
//! they are returned.
//!
//! ## Key Types
//!
//! - [`BlobClient`] - Upload, fetch, exists, list and delete
//! - [`BlobDescriptor`] - Metadata for a stored blob
//! - [`BlobClientConfig`] - Server list and timeouts
//! - [`BlobError`] - What callers see when an operation fails
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bytes::Bytes;
//! use nostrmart_blob::{BlobClient, BlobClientConfig};
//! use nostrmart_core::{sha256_hex, unix_now, EventBuilder, Keypair};
//!
//! async fn example() {
//!     let client = BlobClient::new(BlobClientConfig::default()).unwrap();
//!     let keypair = Keypair::generate();
//!
//!     let data = Bytes::from_static(b"hello");
//!     let auth = EventBuilder::blob_auth("upload", Some(&sha256_hex(&data)), unix_now() + 600)
//!         .sign(&keypair);
//!
//!     let descriptor = client
//!         .upload(data, "hello.txt", &auth, Some("text/plain"))
//!         .await
//!         .unwrap();
//!     let bytes = client.fetch(&descriptor.sha256).await.unwrap();
//!     assert_eq!(&bytes[..], b"hello");
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **First-wins**: upload, fetch and exists stop at the first good server
//! - **Collect-all**: list and delete query every server in one pass
//! - **Idempotent delete**: a 404 counts as already deleted

pub mod auth;
pub mod client;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod strategy;

pub use auth::{authorization_header, parse_authorization_header};
pub use client::BlobClient;
pub use config::{BlobClientConfig, DEFAULT_SERVERS};
pub use descriptor::{BlobDescriptor, ServerInfo};
pub use error::{AttemptError, BlobError, Result};
