//! # JSON Web Keys
//!
//! OKP / Ed25519 keys in JWK form (RFC 8037), JWK sets, and RFC 7638
//! thumbprints used as key fingerprints by the trusted-key registry.
//!
//! Keys of other types (RSA, EC) are carried through untouched in
//! [`Jwk::extra`] so that a registry listing them still yields fingerprints,
//! but only Ed25519 keys can sign or verify.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::ed25519::{Ed25519KeyPair, Ed25519PublicKey};
use crate::error::CryptoError;

/// `kty` for octet key pairs.
pub const KTY_OKP: &str = "OKP";
/// `crv` for Ed25519.
pub const CRV_ED25519: &str = "Ed25519";
/// JWS `alg` for Ed25519 signatures.
pub const ALG_EDDSA: &str = "EdDSA";

/// A JSON Web Key.
///
/// `Debug` never prints the private component `d`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    /// Key type (`OKP` for Ed25519).
    pub kty: String,

    /// Curve name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crv: Option<String>,

    /// Public key, base64url.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,

    /// Private key seed, base64url. Present only on private JWKs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,

    /// Key identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,

    /// Intended algorithm.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,

    /// Intended use (`sig`).
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub key_use: Option<String>,

    /// Any other members (RSA `n`/`e`, EC `y`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Jwk {
    /// Public JWK for an Ed25519 key.
    pub fn from_public_key(public_key: &Ed25519PublicKey, kid: Option<String>) -> Self {
        Self {
            kty: KTY_OKP.to_string(),
            crv: Some(CRV_ED25519.to_string()),
            x: Some(public_key.to_base64url()),
            d: None,
            kid,
            alg: Some(ALG_EDDSA.to_string()),
            key_use: Some("sig".to_string()),
            extra: Map::new(),
        }
    }

    /// Private JWK for an Ed25519 key pair.
    pub fn from_keypair(keypair: &Ed25519KeyPair, kid: Option<String>) -> Self {
        let mut jwk = Self::from_public_key(&keypair.public_key(), kid);
        jwk.d = Some(URL_SAFE_NO_PAD.encode(keypair.seed()));
        jwk
    }

    /// Returns true if the key carries private material.
    pub fn is_private(&self) -> bool {
        self.d.is_some()
    }

    /// A copy with private material removed.
    pub fn to_public(&self) -> Self {
        Self {
            d: None,
            ..self.clone()
        }
    }

    /// Returns true if this is an Ed25519 OKP key.
    pub fn is_ed25519(&self) -> bool {
        self.kty == KTY_OKP && self.crv.as_deref() == Some(CRV_ED25519)
    }

    /// Extract the Ed25519 public key.
    pub fn ed25519_public_key(&self) -> Result<Ed25519PublicKey, CryptoError> {
        if !self.is_ed25519() {
            return Err(CryptoError::UnsupportedAlgorithm(format!(
                "key type {}/{} is not OKP/Ed25519",
                self.kty,
                self.crv.as_deref().unwrap_or("-")
            )));
        }
        let x = self
            .x
            .as_deref()
            .ok_or_else(|| CryptoError::KeyError("JWK missing 'x' parameter".into()))?;
        Ed25519PublicKey::from_base64url(x)
    }

    /// Extract the Ed25519 key pair from a private JWK.
    ///
    /// When `x` is present it must match the public key derived from `d`.
    pub fn ed25519_keypair(&self) -> Result<Ed25519KeyPair, CryptoError> {
        if !self.is_ed25519() {
            return Err(CryptoError::UnsupportedAlgorithm(format!(
                "key type {} cannot sign EdDSA tokens",
                self.kty
            )));
        }
        let d = self
            .d
            .as_deref()
            .ok_or_else(|| CryptoError::KeyError("JWK has no private component 'd'".into()))?;
        let bytes = URL_SAFE_NO_PAD
            .decode(d.trim())
            .map_err(|e| CryptoError::KeyError(format!("private key is not base64url: {e}")))?;
        let seed: [u8; 32] = bytes.try_into().map_err(|v: Vec<u8>| {
            CryptoError::KeyError(format!("private key must be 32 bytes, got {}", v.len()))
        })?;
        let keypair = Ed25519KeyPair::from_seed(&seed);

        if self.x.is_some() && self.ed25519_public_key()? != keypair.public_key() {
            return Err(CryptoError::KeyError(
                "JWK 'x' does not match the private key".into(),
            ));
        }
        Ok(keypair)
    }

    /// RFC 7638 thumbprint of this key.
    pub fn thumbprint(&self) -> Result<String, CryptoError> {
        thumbprint(&serde_json::to_value(self)?)
    }
}

impl std::fmt::Debug for Jwk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Jwk")
            .field("kty", &self.kty)
            .field("crv", &self.crv)
            .field("x", &self.x)
            .field("d", &self.d.as_ref().map(|_| "[REDACTED]"))
            .field("kid", &self.kid)
            .field("alg", &self.alg)
            .finish_non_exhaustive()
    }
}

/// Members that make up the thumbprint input for each key type.
fn required_members(kty: &str) -> Option<&'static [&'static str]> {
    match kty {
        "OKP" => Some(&["crv", "kty", "x"]),
        "EC" => Some(&["crv", "kty", "x", "y"]),
        "RSA" => Some(&["e", "kty", "n"]),
        "oct" => Some(&["k", "kty"]),
        _ => None,
    }
}

/// Compute the RFC 7638 thumbprint of a JWK given as JSON.
///
/// The thumbprint input is the required members only, lexicographically
/// ordered, without whitespace: exactly what the canonical serializer
/// produces for an object of plain strings. The SHA-256 digest is returned
/// as unpadded base64url.
pub fn thumbprint(jwk: &Value) -> Result<String, CryptoError> {
    let obj = jwk
        .as_object()
        .ok_or_else(|| CryptoError::KeyError("JWK must be a JSON object".into()))?;
    let kty = obj
        .get("kty")
        .and_then(Value::as_str)
        .ok_or_else(|| CryptoError::KeyError("JWK missing 'kty'".into()))?;
    let members = required_members(kty)
        .ok_or_else(|| CryptoError::KeyError(format!("unknown key type {kty:?}")))?;

    let mut required = Map::new();
    for name in members {
        let value = obj
            .get(*name)
            .and_then(Value::as_str)
            .ok_or_else(|| CryptoError::KeyError(format!("JWK missing '{name}'")))?;
        required.insert((*name).to_string(), Value::String(value.to_string()));
    }

    let canonical = sigstack_core::serialize(&Value::Object(required));
    Ok(URL_SAFE_NO_PAD.encode(Sha256::digest(canonical.as_bytes())))
}

/// A JWK set, `{"keys": [...]}`, as served at a `jku` URL or by a
/// trusted-key registry.
///
/// Entries stay as raw JSON: sets routinely mix key types this crate cannot
/// use, and one unusable entry must not make the whole set unreadable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JwkSet {
    /// The keys.
    #[serde(default)]
    pub keys: Vec<Value>,
}

impl JwkSet {
    /// Find the entry with the given `kid` and parse it.
    pub fn find(&self, kid: &str) -> Option<Result<Jwk, CryptoError>> {
        self.keys
            .iter()
            .find(|k| k.get("kid").and_then(Value::as_str) == Some(kid))
            .map(|k| serde_json::from_value::<Jwk>(k.clone()).map_err(CryptoError::from))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if the set has no entries.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
