//! Event: the signed unit of identity-bearing data.
//!
//! Events travel as JSON with hex-encoded `id`, `pubkey` and `sig`. They are
//! kept in wire form here so that malformed input can be represented and
//! rejected with a reason, rather than failing somewhere inside parsing.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::canonical::{compute_event_id, EventFields};
use crate::crypto::{Keypair, PublicKey, Signature};
use crate::error::{CoreError, Result};
use crate::types::{decode_fixed_hex, EventId};

/// Reserved event kinds.
pub mod kinds {
    /// Short text note.
    pub const TEXT_NOTE: u16 = 1;
    /// Client authentication (login challenge response).
    pub const CLIENT_AUTH: u16 = 22242;
    /// Blob server authorization.
    pub const BLOB_AUTH: u16 = 24242;
}

/// Default maximum content size in bytes.
pub const DEFAULT_MAX_CONTENT_BYTES: usize = 65536;

/// How far ahead of the local clock an event's `created_at` may be.
pub const MAX_FUTURE_SKEW_SECS: u64 = 3600;

/// A single tag: a non-empty, ordered list of strings.
///
/// The first element names the tag (`e`, `p`, `t`, `challenge`, ...) and the
/// rest carry its data. Empty tags are rejected on construction and on
/// deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>")]
pub struct Tag(Vec<String>);

impl Tag {
    /// Build a tag from its fields.
    pub fn new(fields: Vec<String>) -> Result<Self> {
        if fields.is_empty() {
            return Err(CoreError::MalformedEvent("tag must not be empty".into()));
        }
        Ok(Self(fields))
    }

    /// Build a two-element `[name, value]` tag.
    pub fn pair(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self(vec![name.into(), value.into()])
    }

    /// The tag name (first element).
    pub fn name(&self) -> &str {
        &self.0[0]
    }

    /// The first value after the name, if any.
    pub fn value(&self) -> Option<&str> {
        self.0.get(1).map(String::as_str)
    }

    /// All fields, name included.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl TryFrom<Vec<String>> for Tag {
    type Error = CoreError;

    fn try_from(fields: Vec<String>) -> Result<Self> {
        Tag::new(fields)
    }
}

/// A Nostr event in wire form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Hex SHA-256 of the canonical serialization.
    pub id: String,
    /// Hex x-only public key of the author.
    pub pubkey: String,
    /// Unix timestamp in seconds. Author-claimed, untrusted.
    pub created_at: u64,
    /// Kind number classifying the event's purpose.
    pub kind: u16,
    /// Ordered tags.
    pub tags: Vec<Tag>,
    /// Arbitrary content.
    pub content: String,
    /// Hex BIP-340 signature over the id.
    pub sig: String,
}

impl Event {
    /// Borrow the identity-bearing fields for hashing.
    pub fn fields(&self) -> EventFields<'_> {
        EventFields {
            pubkey: &self.pubkey,
            created_at: self.created_at,
            kind: self.kind,
            tags: &self.tags,
            content: &self.content,
        }
    }

    /// Recompute the id from the event's fields.
    pub fn compute_id(&self) -> EventId {
        compute_event_id(&self.fields())
    }

    /// Parse the claimed id.
    pub fn event_id(&self) -> Result<EventId> {
        EventId::from_hex(&self.id)
    }

    /// Parse the author's public key.
    pub fn public_key(&self) -> Result<PublicKey> {
        PublicKey::from_hex(&self.pubkey)
    }

    /// Parse the signature.
    pub fn signature(&self) -> Result<Signature> {
        Signature::from_hex(&self.sig)
    }

    /// First tag with the given name.
    pub fn tag(&self, name: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| t.name() == name)
    }

    /// Value of the first tag with the given name.
    pub fn tag_value(&self, name: &str) -> Option<&str> {
        self.tag(name).and_then(Tag::value)
    }

    /// All tags with the given name, in order.
    pub fn tags_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Tag> + 'a {
        self.tags.iter().filter(move |t| t.name() == name)
    }

    /// Structural checks at the data-model boundary.
    ///
    /// Checks hex field sizes, content size and that `created_at` is not
    /// implausibly far in the future. Tags are non-empty by construction. Does not touch the id or the
    /// signature; see [`crate::verify_event`] for that.
    pub fn check(&self, max_content_bytes: usize, now: u64) -> Result<()> {
        decode_fixed_hex::<32>("id", &self.id)?;
        decode_fixed_hex::<32>("pubkey", &self.pubkey)?;
        decode_fixed_hex::<64>("sig", &self.sig)?;

        if self.content.len() > max_content_bytes {
            return Err(CoreError::ContentTooLarge {
                max: max_content_bytes,
                actual: self.content.len(),
            });
        }

        if self.created_at > now.saturating_add(MAX_FUTURE_SKEW_SECS) {
            return Err(CoreError::TimestampInFuture {
                created_at: self.created_at,
                now,
                max_skew: MAX_FUTURE_SKEW_SECS,
            });
        }

        Ok(())
    }

    /// Compact JSON, as sent on the wire and inside authorization headers.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| CoreError::MalformedEvent(e.to_string()))
    }

    /// Parse from JSON. Empty tags are rejected here.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| CoreError::MalformedEvent(e.to_string()))
    }
}

/// Builder for signed events.
#[derive(Debug, Clone)]
pub struct EventBuilder {
    kind: u16,
    created_at: Option<u64>,
    tags: Vec<Tag>,
    content: String,
}

impl EventBuilder {
    /// Start an event of the given kind.
    pub fn new(kind: u16) -> Self {
        Self {
            kind,
            created_at: None,
            tags: Vec::new(),
            content: String::new(),
        }
    }

    /// A client authentication event answering a login challenge.
    pub fn auth(challenge: &str, relay: Option<&str>) -> Self {
        let mut builder = Self::new(kinds::CLIENT_AUTH);
        if let Some(relay) = relay {
            builder = builder.tag(Tag::pair("relay", relay));
        }
        builder.tag(Tag::pair("challenge", challenge))
    }

    /// A blob server authorization event for `action` (`upload`, `get`,
    /// `list`, `delete`), valid until `expiration`.
    pub fn blob_auth(action: &str, sha256: Option<&str>, expiration: u64) -> Self {
        let mut builder = Self::new(kinds::BLOB_AUTH)
            .content(format!("{} blob", capitalize(action)))
            .tag(Tag::pair("t", action));
        if let Some(hash) = sha256 {
            builder = builder.tag(Tag::pair("x", hash));
        }
        builder.tag(Tag::pair("expiration", expiration.to_string()))
    }

    /// Set the timestamp. Defaults to now.
    pub fn created_at(mut self, created_at: u64) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Append a tag.
    pub fn tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }

    /// Set the content.
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Compute the id and sign it.
    pub fn sign(self, keypair: &Keypair) -> Event {
        let mut event = Event {
            id: String::new(),
            pubkey: keypair.public_key().to_hex(),
            created_at: self.created_at.unwrap_or_else(unix_now),
            kind: self.kind,
            tags: self.tags,
            content: self.content,
            sig: String::new(),
        };
        let id = event.compute_id();
        event.sig = keypair.sign(id.as_bytes()).to_hex();
        event.id = id.to_hex();
        event
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Current Unix time in seconds.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
