//! Cryptographic primitives for NostrMart.
//!
//! Wraps BIP-340 Schnorr signing over secp256k1 and SHA-256 hashing with
//! strong types.

use std::fmt;
use std::sync::OnceLock;

use secp256k1::{schnorr, All, Message, Secp256k1, XOnlyPublicKey};
use sha2::{Digest, Sha256};

use crate::error::CoreError;
use crate::types::decode_fixed_hex;

/// Shared secp256k1 context. Building one allocates precomputation tables,
/// so it is created once per process.
fn secp() -> &'static Secp256k1<All> {
    static CONTEXT: OnceLock<Secp256k1<All>> = OnceLock::new();
    CONTEXT.get_or_init(Secp256k1::new)
}

/// A 32-byte SHA-256 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sha256Hash(pub [u8; 32]);

impl Sha256Hash {
    /// Compute the SHA-256 hash of the given data.
    pub fn hash(data: &[u8]) -> Self {
        Self(Sha256::digest(data).into())
    }

    /// Create from raw bytes.
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
        decode_fixed_hex::<32>("sha256", s).map(Self)
    }
}

impl fmt::Debug for Sha256Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sha256({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for Sha256Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl AsRef<[u8]> for Sha256Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Hex SHA-256 of `data`, the content address of a blob.
pub fn sha256_hex(data: &[u8]) -> String {
    Sha256Hash::hash(data).to_hex()
}

/// A 32-byte x-only secp256k1 public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey(pub [u8; 32]);

impl PublicKey {
    /// Create from raw bytes. The bytes are not checked to lie on the curve
    /// until [`PublicKey::verify`] is called.
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
        decode_fixed_hex::<32>("pubkey", s).map(Self)
    }

    /// Verify a BIP-340 signature over a 32-byte digest.
    pub fn verify(&self, digest: &[u8; 32], signature: &Signature) -> Result<(), CoreError> {
        let key = XOnlyPublicKey::from_slice(&self.0).map_err(|_| CoreError::InvalidPublicKey)?;
        let sig =
            schnorr::Signature::from_slice(&signature.0).map_err(|_| CoreError::InvalidSignature)?;
        let msg = Message::from_digest(*digest);

        secp()
            .verify_schnorr(&sig, &msg, &key)
            .map_err(|_| CoreError::InvalidSignature)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for PublicKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for PublicKey {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// A 64-byte BIP-340 Schnorr signature.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature(pub [u8; 64]);

impl Signature {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Convert to lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from a 128-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        decode_fixed_hex::<64>("sig", s).map(Self)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({}...)", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// A secp256k1 keypair for signing events.
#[derive(Clone)]
pub struct Keypair {
    inner: secp256k1::Keypair,
}

impl Keypair {
    /// Generate a new random keypair.
    pub fn generate() -> Self {
        let inner = secp256k1::Keypair::new(secp(), &mut rand::thread_rng());
        Self { inner }
    }

    /// Create from 32 secret key bytes.
    pub fn from_secret_bytes(secret: &[u8; 32]) -> Result<Self, CoreError> {
        let inner = secp256k1::Keypair::from_seckey_slice(secp(), secret)
            .map_err(|_| CoreError::InvalidSecretKey)?;
        Ok(Self { inner })
    }

    /// Get the x-only public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.inner.x_only_public_key().0.serialize())
    }

    /// Sign a 32-byte digest. Signing uses no auxiliary randomness, so the
    /// same key and digest always produce the same signature.
    pub fn sign(&self, digest: &[u8; 32]) -> Signature {
        let msg = Message::from_digest(*digest);
        let sig = secp().sign_schnorr_no_aux_rand(&msg, &self.inner);
        let mut bytes = [0u8; 64];
        bytes.copy_from_slice(sig.as_ref());
        Signature(bytes)
    }

    /// Get the raw secret key bytes.
    pub fn secret_bytes(&self) -> [u8; 32] {
        self.inner.secret_bytes()
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keypair({:?})", self.public_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypair_sign_verify() {
        let keypair = Keypair::generate();
        let digest = Sha256Hash::hash(b"hello world").0;
        let signature = keypair.sign(&digest);

        keypair
            .public_key()
            .verify(&digest, &signature)
            .expect("valid signature should verify");

        let tampered = Sha256Hash::hash(b"hello worlD").0;
        assert!(keypair.public_key().verify(&tampered, &signature).is_err());
    }

    #[test]
    fn test_generated_keypairs_are_distinct() {
        let a = Keypair::generate();
        let b = Keypair::generate();
        assert_ne!(a.public_key(), b.public_key());
    }

    #[test]
    fn test_keypair_deterministic_from_secret() {
        let secret = [0x42u8; 32];
        let kp1 = Keypair::from_secret_bytes(&secret).unwrap();
        let kp2 = Keypair::from_secret_bytes(&secret).unwrap();
        assert_eq!(kp1.public_key(), kp2.public_key());

        let digest = [0x07u8; 32];
        assert_eq!(kp1.sign(&digest), kp2.sign(&digest));
    }

    #[test]
    fn test_zero_secret_rejected() {
        let result = Keypair::from_secret_bytes(&[0u8; 32]);
        assert!(matches!(result, Err(CoreError::InvalidSecretKey)));
    }

    #[test]
    fn test_wrong_key_fails() {
        let signer = Keypair::from_secret_bytes(&[0x01; 32]).unwrap();
        let other = Keypair::from_secret_bytes(&[0x02; 32]).unwrap();
        let digest = [0x11u8; 32];
        let signature = signer.sign(&digest);
        assert!(other.public_key().verify(&digest, &signature).is_err());
    }

    #[test]
    fn test_off_curve_public_key_rejected() {
        // BIP-340 test vector 5: public key not on the curve.
        let key = PublicKey::from_hex(
            "eefdea4cdb677750a420fee807eacf21eb9898ae79b9768766e4faa04a2d4a34",
        )
        .unwrap();
        let result = key.verify(&[0u8; 32], &Signature::from_bytes([1u8; 64]));
        assert!(matches!(result, Err(CoreError::InvalidPublicKey)));
    }

    #[test]
    fn test_sha256_known_value() {
        assert_eq!(
            sha256_hex(b"hello"),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_public_key_hex_roundtrip() {
        let pk = Keypair::generate().public_key();
        let recovered = PublicKey::from_hex(&pk.to_hex()).unwrap();
        assert_eq!(pk, recovered);
    }
}
