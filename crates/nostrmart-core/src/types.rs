//! Strong type definitions for NostrMart identifiers.
//!
//! Wire-level events carry identifiers as hex strings; these newtypes are
//! what the encoder and verifier work with once the hex has been checked.

use std::fmt;

use crate::error::CoreError;

/// A 32-byte event identifier, computed as SHA-256 over the canonical
/// serialization of an event's identity-bearing fields.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventId(pub [u8; 32]);

impl EventId {
    /// Create a new EventId from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from a 64-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        decode_fixed_hex::<32>("id", s).map(Self)
    }
}

impl fmt::Debug for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventId({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl AsRef<[u8]> for EventId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for EventId {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// Decode a hex string that must hold exactly `N` bytes.
///
/// The length is checked on the text before decoding so that an oversized
/// input is rejected without allocating for it.
pub(crate) fn decode_fixed_hex<const N: usize>(
    field: &'static str,
    s: &str,
) -> Result<[u8; N], CoreError> {
    if s.len() != N * 2 {
        return Err(CoreError::InvalidLength {
            field,
            expected: N * 2,
            actual: s.len(),
        });
    }
    let mut out = [0u8; N];
    hex::decode_to_slice(s, &mut out).map_err(|_| CoreError::InvalidHex(field))?;
    Ok(out)
}
