//! # Ed25519 Signing and Verification
//!
//! Key generation, signing and verification for signature tokens.
//!
//! ## Security Invariant
//!
//! - Signing input MUST be `&SigningInput`, which only the JWS codec can
//!   build. Arbitrary bytes cannot be signed with a document key.
//! - Private keys are never serialized or logged. `Ed25519KeyPair` does not
//!   implement `Serialize`, and its `Debug` output is redacted.
//!
//! ## Serde
//!
//! Public keys and signatures serialize as unpadded base64url strings, the
//! encoding used inside JWKs and compact JWS tokens.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use ed25519_dalek::{Signer, Verifier};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CryptoError;
use crate::jws::SigningInput;

/// An Ed25519 public key (32 bytes) for signature verification.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Ed25519PublicKey(pub [u8; 32]);

/// An Ed25519 signature (64 bytes).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Ed25519Signature(pub [u8; 64]);

/// An Ed25519 key pair for signing operations.
pub struct Ed25519KeyPair {
    signing_key: ed25519_dalek::SigningKey,
}

// ---------------------------------------------------------------------------
// Ed25519PublicKey impls
// ---------------------------------------------------------------------------

impl Ed25519PublicKey {
    /// Create a public key from raw 32 bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Return the raw 32-byte public key.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render the public key as unpadded base64url.
    pub fn to_base64url(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.0)
    }

    /// Parse a public key from unpadded base64url.
    pub fn from_base64url(s: &str) -> Result<Self, CryptoError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(s.trim())
            .map_err(|e| CryptoError::KeyError(format!("public key is not base64url: {e}")))?;
        let arr: [u8; 32] = bytes.try_into().map_err(|v: Vec<u8>| {
            CryptoError::KeyError(format!("public key must be 32 bytes, got {}", v.len()))
        })?;
        Ok(Self(arr))
    }

    /// Convert to an `ed25519_dalek::VerifyingKey` for verification operations.
    pub fn to_verifying_key(&self) -> Result<ed25519_dalek::VerifyingKey, CryptoError> {
        ed25519_dalek::VerifyingKey::from_bytes(&self.0)
            .map_err(|e| CryptoError::KeyError(format!("invalid public key: {e}")))
    }
}

impl Serialize for Ed25519PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64url())
    }
}

impl<'de> Deserialize<'de> for Ed25519PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_base64url(&s).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519PublicKey({}...)", hex_prefix(&self.0))
    }
}

impl std::fmt::Display for Ed25519PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_base64url())
    }
}

// ---------------------------------------------------------------------------
// Ed25519Signature impls
// ---------------------------------------------------------------------------

impl Ed25519Signature {
    /// Create a signature from raw 64 bytes.
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Return the raw 64-byte signature.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Render the signature as unpadded base64url.
    pub fn to_base64url(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.0)
    }

    /// Parse a signature from unpadded base64url.
    pub fn from_base64url(s: &str) -> Result<Self, CryptoError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(s)
            .map_err(|e| CryptoError::MalformedToken(format!("signature is not base64url: {e}")))?;
        let arr: [u8; 64] = bytes.try_into().map_err(|v: Vec<u8>| {
            CryptoError::MalformedToken(format!("signature must be 64 bytes, got {}", v.len()))
        })?;
        Ok(Self(arr))
    }
}

impl Serialize for Ed25519Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64url())
    }
}

impl<'de> Deserialize<'de> for Ed25519Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_base64url(&s).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for Ed25519Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519Signature({}...)", hex_prefix(&self.0))
    }
}

// ---------------------------------------------------------------------------
// Ed25519KeyPair impls
// ---------------------------------------------------------------------------

impl Ed25519KeyPair {
    /// Generate a new random Ed25519 key pair.
    pub fn generate() -> Self {
        let mut csprng = rand::rngs::OsRng;
        let signing_key = ed25519_dalek::SigningKey::generate(&mut csprng);
        Self { signing_key }
    }

    /// Create a key pair from a raw 32-byte private key seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = ed25519_dalek::SigningKey::from_bytes(seed);
        Self { signing_key }
    }

    /// Get the public key from this key pair.
    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// The 32-byte private seed. Only used to export the key as a JWK.
    pub(crate) fn seed(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }

    /// Sign a JWS signing input.
    pub fn sign(&self, input: &SigningInput) -> Ed25519Signature {
        let sig = self.signing_key.sign(input.as_bytes());
        Ed25519Signature(sig.to_bytes())
    }
}

impl std::fmt::Debug for Ed25519KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519KeyPair(<private>)")
    }
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// Verify an Ed25519 signature over a JWS signing input.
///
/// Returns `Ok(())` if valid, `Err(CryptoError::VerificationFailed)`
/// otherwise.
pub fn verify(
    input: &SigningInput,
    signature: &Ed25519Signature,
    public_key: &Ed25519PublicKey,
) -> Result<(), CryptoError> {
    let vk = public_key.to_verifying_key()?;
    let sig = ed25519_dalek::Signature::from_bytes(&signature.0);
    vk.verify(input.as_bytes(), &sig)
        .map_err(|e| CryptoError::VerificationFailed(format!("Ed25519 verification failed: {e}")))
}

fn hex_prefix(bytes: &[u8]) -> String {
    bytes.iter().take(4).map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(text: &str) -> SigningInput {
        SigningInput::from_parts(text, "payload")
    }

    #[test]
    fn test_keypair_generation() {
        let kp = Ed25519KeyPair::generate();
        assert_eq!(kp.public_key().as_bytes().len(), 32);
    }

    #[test]
    fn test_sign_and_verify() {
        let kp = Ed25519KeyPair::generate();
        let data = input("header");
        let sig = kp.sign(&data);
        verify(&data, &sig, &kp.public_key()).expect("valid signature should verify");
    }

    #[test]
    fn test_verify_wrong_key_fails() {
        let kp1 = Ed25519KeyPair::generate();
        let kp2 = Ed25519KeyPair::generate();
        let data = input("header");
        let sig = kp1.sign(&data);
        assert!(verify(&data, &sig, &kp2.public_key()).is_err());
    }

    #[test]
    fn test_verify_wrong_message_fails() {
        let kp = Ed25519KeyPair::generate();
        let sig = kp.sign(&input("original"));
        assert!(verify(&input("tampered"), &sig, &kp.public_key()).is_err());
    }

    #[test]
    fn test_deterministic_from_seed() {
        let seed = [42u8; 32];
        let kp1 = Ed25519KeyPair::from_seed(&seed);
        let kp2 = Ed25519KeyPair::from_seed(&seed);
        assert_eq!(kp1.public_key(), kp2.public_key());
        assert_eq!(kp1.seed(), seed);

        let data = input("deterministic");
        assert_eq!(kp1.sign(&data), kp2.sign(&data));
    }

    #[test]
    fn test_public_key_base64url_roundtrip() {
        let pk = Ed25519KeyPair::generate().public_key();
        let b64 = pk.to_base64url();
        assert_eq!(b64.len(), 43);
        assert!(!b64.contains('='));
        assert_eq!(Ed25519PublicKey::from_base64url(&b64).unwrap(), pk);
    }

    #[test]
    fn test_signature_base64url_roundtrip() {
        let kp = Ed25519KeyPair::generate();
        let sig = kp.sign(&input("x"));
        let b64 = sig.to_base64url();
        assert_eq!(b64.len(), 86);
        assert_eq!(Ed25519Signature::from_base64url(&b64).unwrap(), sig);
    }

    #[test]
    fn test_public_key_serde_json() {
        let pk = Ed25519KeyPair::generate().public_key();
        let json = serde_json::to_string(&pk).unwrap();
        assert_eq!(json.len(), 43 + 2);
        let back: Ed25519PublicKey = serde_json::from_str(&json).unwrap();
        assert_eq!(pk, back);
    }

    #[test]
    fn test_public_key_invalid_encoding() {
        assert!(Ed25519PublicKey::from_base64url("not base64!").is_err());
        assert!(Ed25519PublicKey::from_base64url("AAAA").is_err());
    }

    #[test]
    fn test_signature_invalid_encoding() {
        assert!(Ed25519Signature::from_base64url("***").is_err());
        assert!(Ed25519Signature::from_base64url("AAAA").is_err());
    }

    #[test]
    fn test_debug_does_not_leak_private_key() {
        let kp = Ed25519KeyPair::generate();
        let debug = format!("{kp:?}");
        assert_eq!(debug, "Ed25519KeyPair(<private>)");
    }

    #[test]
    fn test_debug_public_key_shows_prefix() {
        let pk = Ed25519KeyPair::generate().public_key();
        let debug = format!("{pk:?}");
        assert!(debug.starts_with("Ed25519PublicKey("));
        assert!(debug.ends_with("...)"));
    }
}
