//! `Authorization: Nostr <base64>` header encoding.
//!
//! Blob servers authorize requests with a signed kind-24242 event, sent as
//! base64 of its compact JSON.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use nostrmart_core::{CoreError, Event};

/// Scheme prefix of the header value.
pub const SCHEME: &str = "Nostr";

/// Encode an event as an `Authorization` header value.
pub fn authorization_header(event: &Event) -> Result<String, CoreError> {
    let json = event.to_json()?;
    Ok(format!("{} {}", SCHEME, STANDARD.encode(json)))
}

/// Decode an `Authorization` header value back into an event.
///
/// Returns `None` for any other scheme or malformed payload.
pub fn parse_authorization_header(value: &str) -> Option<Event> {
    let (scheme, payload) = value.split_once(' ')?;
    if scheme != SCHEME {
        return None;
    }
    let json = STANDARD.decode(payload.trim()).ok()?;
    let json = String::from_utf8(json).ok()?;
    Event::from_json(&json).ok()
}
