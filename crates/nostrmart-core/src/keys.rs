//! Public key text encodings: raw hex and bech32 `npub`.
//!
//! An `npub` is the 32-byte x-only key under the human-readable part `npub`
//! with a BIP-173 checksum, always 63 characters long. Decoding is strict:
//! the result must re-encode to exactly the input (case aside), which rules
//! out bech32m checksums and non-zero padding bits.

use bech32::primitives::iter::{ByteIterExt, Fe32IterExt};
use bech32::{Bech32, Hrp};

use crate::crypto::PublicKey;
use crate::error::KeyError;

/// Human-readable part for public keys.
pub const NPUB_HRP: Hrp = Hrp::parse_unchecked("npub");

/// Length of an encoded npub.
pub const NPUB_LEN: usize = 63;

/// Encode a public key as `npub1...`.
///
/// Writes the checksummed characters straight from the key bytes. A 32-byte
/// payload is always well under the bech32 code length, so there is no
/// failure case.
pub fn encode_npub(key: &PublicKey) -> String {
    key.as_bytes()
        .iter()
        .copied()
        .bytes_to_fes()
        .with_checksum::<Bech32>(&NPUB_HRP)
        .chars()
        .collect()
}

/// Decode an `npub1...` string into a public key.
pub fn decode_npub(npub: &str) -> Result<PublicKey, KeyError> {
    if npub.len() != NPUB_LEN {
        return Err(KeyError::InvalidLength {
            expected: NPUB_LEN,
            actual: npub.len(),
        });
    }

    let lower = npub.to_ascii_lowercase();
    if !lower.starts_with("npub1") {
        let prefix = lower.rsplit_once('1').map(|(hrp, _)| hrp).unwrap_or(&lower);
        return Err(KeyError::InvalidPrefix(prefix.to_string()));
    }

    let (hrp, data) = bech32::decode(npub).map_err(|e| KeyError::InvalidBech32(e.to_string()))?;
    let hrp = hrp.to_lowercase();
    if hrp != "npub" {
        return Err(KeyError::InvalidPrefix(hrp));
    }

    let bytes: [u8; 32] = data
        .as_slice()
        .try_into()
        .map_err(|_| KeyError::InvalidPayloadLength(data.len()))?;
    let key = PublicKey::from_bytes(bytes);

    if encode_npub(&key) != lower {
        return Err(KeyError::NonCanonical);
    }

    Ok(key)
}

/// Convert an npub to lowercase hex.
pub fn npub_to_hex(npub: &str) -> Result<String, KeyError> {
    decode_npub(npub).map(|key| key.to_hex())
}

/// Convert a 64-character hex public key to an npub.
pub fn hex_to_npub(hex: &str) -> Result<String, KeyError> {
    let key = PublicKey::from_hex(hex).map_err(|_| KeyError::InvalidHex)?;
    Ok(encode_npub(&key))
}

/// Whether the string is a well-formed npub.
pub fn is_valid_npub(npub: &str) -> bool {
    decode_npub(npub).is_ok()
}

/// Whether the string is 64 characters of hex.
pub fn is_valid_hex_pubkey(hex: &str) -> bool {
    PublicKey::from_hex(hex).is_ok()
}
