//! Signing key material in the forms callers hand it over.

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;

use crate::ed25519::Ed25519KeyPair;
use crate::error::CryptoError;
use crate::jwk::Jwk;

/// A private signing key, as supplied by a caller.
///
/// Resolve it once with [`KeyMaterial::keypair()`]; textual forms are
/// interpreted as, in order: a JSON JWK, 64 hex characters of seed, or
/// base64 / base64url of a 32-byte seed.
#[derive(Clone)]
pub enum KeyMaterial {
    /// A private JWK.
    Jwk(Jwk),
    /// A raw 32-byte Ed25519 seed.
    Seed([u8; 32]),
    /// Text in one of the accepted encodings.
    Text(String),
}

impl KeyMaterial {
    /// Resolve to a key pair.
    pub fn keypair(&self) -> Result<Ed25519KeyPair, CryptoError> {
        match self {
            Self::Jwk(jwk) => jwk.ed25519_keypair(),
            Self::Seed(seed) => Ok(Ed25519KeyPair::from_seed(seed)),
            Self::Text(text) => parse_text(text)?.keypair(),
        }
    }

    /// The private JWK for this material, if it was supplied as one.
    pub fn as_jwk(&self) -> Option<&Jwk> {
        match self {
            Self::Jwk(jwk) => Some(jwk),
            _ => None,
        }
    }
}

impl From<Jwk> for KeyMaterial {
    fn from(jwk: Jwk) -> Self {
        Self::Jwk(jwk)
    }
}

impl From<&Ed25519KeyPair> for KeyMaterial {
    fn from(keypair: &Ed25519KeyPair) -> Self {
        Self::Seed(keypair.seed())
    }
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Jwk(jwk) => f.debug_tuple("Jwk").field(jwk).finish(),
            Self::Seed(_) => f.write_str("Seed(<private>)"),
            Self::Text(_) => f.write_str("Text(<private>)"),
        }
    }
}

fn parse_text(text: &str) -> Result<KeyMaterial, CryptoError> {
    let text = text.trim();
    if text.starts_with('{') {
        let jwk: Jwk = serde_json::from_str(text)
            .map_err(|e| CryptoError::KeyError(format!("key text is not a valid JWK: {e}")))?;
        return Ok(KeyMaterial::Jwk(jwk));
    }
    if text.len() == 64 && text.bytes().all(|b| b.is_ascii_hexdigit()) {
        let mut seed = [0u8; 32];
        for (i, chunk) in text.as_bytes().chunks(2).enumerate() {
            let pair = std::str::from_utf8(chunk)
                .map_err(|e| CryptoError::KeyError(format!("invalid hex seed: {e}")))?;
            seed[i] = u8::from_str_radix(pair, 16)
                .map_err(|e| CryptoError::KeyError(format!("invalid hex seed: {e}")))?;
        }
        return Ok(KeyMaterial::Seed(seed));
    }
    let bytes = URL_SAFE_NO_PAD
        .decode(text.trim_end_matches('='))
        .or_else(|_| STANDARD.decode(text))
        .map_err(|_| {
            CryptoError::KeyError("key text is neither a JWK, hex seed nor base64 seed".into())
        })?;
    let seed: [u8; 32] = bytes.try_into().map_err(|v: Vec<u8>| {
        CryptoError::KeyError(format!("seed must be 32 bytes, got {}", v.len()))
    })?;
    Ok(KeyMaterial::Seed(seed))
}
