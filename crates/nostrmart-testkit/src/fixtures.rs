//! Test fixtures and helpers.
//!
//! Common setup code for unit and integration tests.

use nostrmart_core::{
    encode_npub, kinds, sha256_hex, unix_now, Event, EventBuilder, Keypair, PublicKey, Tag,
};

/// A test fixture holding a signing identity.
pub struct TestFixture {
    pub keypair: Keypair,
}

impl TestFixture {
    /// Create a new test fixture with a random keypair.
    pub fn new() -> Self {
        Self {
            keypair: Keypair::generate(),
        }
    }

    /// Create with a deterministic keypair. `seed` must be non-zero.
    pub fn with_seed(seed: u8) -> Self {
        Self {
            keypair: Keypair::from_secret_bytes(&[seed; 32]).expect("non-zero seed"),
        }
    }

    /// Get the keypair's public key.
    pub fn public_key(&self) -> PublicKey {
        self.keypair.public_key()
    }

    /// Hex public key.
    pub fn pubkey_hex(&self) -> String {
        self.keypair.public_key().to_hex()
    }

    /// Public key as npub.
    pub fn npub(&self) -> String {
        encode_npub(&self.keypair.public_key())
    }

    /// A signed text note.
    pub fn note(&self, content: &str) -> Event {
        self.note_at(content, unix_now())
    }

    /// A signed text note with a fixed timestamp.
    pub fn note_at(&self, content: &str, created_at: u64) -> Event {
        EventBuilder::new(kinds::TEXT_NOTE)
            .created_at(created_at)
            .content(content)
            .sign(&self.keypair)
    }

    /// A login response to `challenge`, timestamped now.
    pub fn auth_event(&self, challenge: &str) -> Event {
        self.auth_event_at(challenge, unix_now())
    }

    /// A login response to `challenge` with a fixed timestamp.
    pub fn auth_event_at(&self, challenge: &str, created_at: u64) -> Event {
        EventBuilder::auth(challenge, None)
            .created_at(created_at)
            .sign(&self.keypair)
    }

    /// A blob authorization event valid for ten minutes.
    pub fn blob_auth(&self, action: &str, sha256: Option<&str>) -> Event {
        let now = unix_now();
        EventBuilder::blob_auth(action, sha256, now + 600)
            .created_at(now)
            .sign(&self.keypair)
    }

    /// A blob upload authorization for `data`.
    pub fn upload_auth(&self, data: &[u8]) -> Event {
        self.blob_auth("upload", Some(&sha256_hex(data)))
    }

    /// A signed event of arbitrary kind with the given tags.
    pub fn event(&self, kind: u16, tags: Vec<Tag>, content: &str) -> Event {
        tags.into_iter()
            .fold(EventBuilder::new(kind), EventBuilder::tag)
            .content(content)
            .sign(&self.keypair)
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Create multiple test fixtures with distinct, deterministic keys.
pub fn multi_party_fixtures(count: usize) -> Vec<TestFixture> {
    (0..count)
        .map(|i| TestFixture::with_seed((i % 255) as u8 + 1))
        .collect()
}
