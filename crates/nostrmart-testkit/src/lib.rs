//! # NostrMart Testkit
//!
//! Testing utilities for NostrMart.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known event ids and npub encodings, computed independently
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Helper structs for signing test events
//!
//! ## Golden Vectors
//!
//! ```rust
//! use nostrmart_testkit::vectors::all_vectors;
//!
//! for vector in all_vectors() {
//!     assert_eq!(vector.compute_id().to_hex(), vector.expected_id);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use nostrmart_testkit::generators::{EventParams, event_from_params};
//!
//! proptest! {
//!     #[test]
//!     fn event_id_is_deterministic(params: EventParams) {
//!         let e1 = event_from_params(&params);
//!         let e2 = event_from_params(&params);
//!         prop_assert_eq!(e1.compute_id(), e2.compute_id());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use nostrmart_testkit::fixtures::TestFixture;
//!
//! let fixture = TestFixture::new();
//! let event = fixture.note("hello");
//! assert!(nostrmart_core::verify_event(&event));
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{multi_party_fixtures, TestFixture};
pub use generators::{event_from_params, EventParams};
pub use vectors::{all_vectors, verify_all_vectors, GoldenVector, NPUB_VECTORS};
