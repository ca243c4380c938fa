//! Canonical event serialization for deterministic event ids.
//!
//! An event id is SHA-256 over the compact JSON array
//!
//! ```text
//! [0,<pubkey>,<created_at>,<kind>,<tags>,<content>]
//! ```
//!
//! - no insignificant whitespace
//! - non-ASCII UTF-8 written verbatim, never `\u` escaped
//! - `"` `\` and control characters escaped the way `JSON.stringify` does
//!
//! The field order and the leading `0` are fixed by the protocol. Any change
//! produces ids that no other client will agree with.
//!
//! The encoder never validates. Tag shape and hex formats are checked at the
//! [`Event`](crate::event::Event) boundary before anything reaches here.

use crate::crypto::Sha256Hash;
use crate::event::Tag;
use crate::types::EventId;

/// The identity-bearing fields of an event, borrowed.
#[derive(Debug, Clone, Copy)]
pub struct EventFields<'a> {
    pub pubkey: &'a str,
    pub created_at: u64,
    pub kind: u16,
    pub tags: &'a [Tag],
    pub content: &'a str,
}

/// Serialize event fields to the canonical byte sequence.
pub fn serialize_for_id(fields: &EventFields<'_>) -> Vec<u8> {
    let mut buf = Vec::with_capacity(96 + fields.content.len());

    buf.extend_from_slice(b"[0,");
    encode_text(&mut buf, fields.pubkey);
    buf.push(b',');
    encode_uint(&mut buf, fields.created_at);
    buf.push(b',');
    encode_uint(&mut buf, u64::from(fields.kind));
    buf.push(b',');
    encode_tags(&mut buf, fields.tags);
    buf.push(b',');
    encode_text(&mut buf, fields.content);
    buf.push(b']');

    buf
}

/// Compute the event id: SHA-256 of the canonical bytes.
pub fn compute_event_id(fields: &EventFields<'_>) -> EventId {
    EventId(Sha256Hash::hash(&serialize_for_id(fields)).0)
}

/// Encode an unsigned integer in decimal.
fn encode_uint(buf: &mut Vec<u8>, n: u64) {
    buf.extend_from_slice(n.to_string().as_bytes());
}

/// Encode the outer tag list: an array of string arrays.
fn encode_tags(buf: &mut Vec<u8>, tags: &[Tag]) {
    buf.push(b'[');
    for (i, tag) in tags.iter().enumerate() {
        if i > 0 {
            buf.push(b',');
        }
        encode_string_array(buf, tag.as_slice());
    }
    buf.push(b']');
}

/// Encode one tag, preserving its internal field order.
fn encode_string_array(buf: &mut Vec<u8>, items: &[String]) {
    buf.push(b'[');
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            buf.push(b',');
        }
        encode_text(buf, item);
    }
    buf.push(b']');
}

/// Encode a JSON string.
fn encode_text(buf: &mut Vec<u8>, s: &str) {
    const HEX: &[u8; 16] = b"0123456789abcdef";

    buf.push(b'"');
    let bytes = s.as_bytes();
    let mut start = 0;

    for (i, &b) in bytes.iter().enumerate() {
        let escape: &[u8] = match b {
            b'"' => b"\\\"",
            b'\\' => b"\\\\",
            b'\n' => b"\\n",
            b'\r' => b"\\r",
            b'\t' => b"\\t",
            0x08 => b"\\b",
            0x0c => b"\\f",
            0x00..=0x1f => b"",
            _ => continue,
        };

        // Multi-byte UTF-8 sequences never contain bytes below 0x80, so
        // slicing at an escapable byte always lands on a char boundary.
        buf.extend_from_slice(&bytes[start..i]);
        if escape.is_empty() {
            buf.extend_from_slice(b"\\u00");
            buf.push(HEX[(b >> 4) as usize]);
            buf.push(HEX[(b & 0x0f) as usize]);
        } else {
            buf.extend_from_slice(escape);
        }
        start = i + 1;
    }

    buf.extend_from_slice(&bytes[start..]);
    buf.push(b'"');
}
