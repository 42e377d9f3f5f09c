//! # Compact JWS
//!
//! Encoding and decoding of compact JSON Web Signature tokens
//! (`header.payload.signature`, each part unpadded base64url) signed with
//! EdDSA over Ed25519.
//!
//! Decoding never verifies: [`decode_compact()`] only splits and parses, and
//! the caller decides which key to check the signature against via
//! [`DecodedToken::verify()`].

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ed25519::{self, Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
use crate::error::CryptoError;
use crate::jwk::{Jwk, ALG_EDDSA};

/// Default `typ` header value.
pub const TYP_JWT: &str = "JWT";

/// The bytes a JWS signature covers: `b64(header) "." b64(payload)`.
///
/// Only constructible inside this crate, so a document key can sign nothing
/// but well-formed token input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningInput(String);

impl SigningInput {
    pub(crate) fn from_parts(header_b64: &str, payload_b64: &str) -> Self {
        Self(format!("{header_b64}.{payload_b64}"))
    }

    /// The signing input as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The signing input as bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

/// The protected header of a signature token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JwsHeader {
    /// Signature algorithm. Always `EdDSA` for tokens this crate produces.
    pub alg: String,

    /// Token type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,

    /// Key type of the signing key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kty: Option<String>,

    /// Identifier of the signing key, used with `jku`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,

    /// Embedded public key of the signer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwk: Option<Jwk>,

    /// URL of a JWK set containing the signing key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jku: Option<String>,

    /// Issued-at, seconds since the epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Any other header parameters.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl JwsHeader {
    /// A bare EdDSA header with `typ: JWT`.
    pub fn eddsa() -> Self {
        Self {
            alg: ALG_EDDSA.to_string(),
            typ: Some(TYP_JWT.to_string()),
            kty: None,
            kid: None,
            jwk: None,
            jku: None,
            iat: None,
            extra: Map::new(),
        }
    }
}

/// Sign `payload` and encode the result as a compact JWS.
pub fn encode_compact(
    header: &JwsHeader,
    payload: &impl Serialize,
    keypair: &Ed25519KeyPair,
) -> Result<String, CryptoError> {
    if header.alg != ALG_EDDSA {
        return Err(CryptoError::UnsupportedAlgorithm(header.alg.clone()));
    }
    let header_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(header)?);
    let payload_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(payload)?);
    let input = SigningInput::from_parts(&header_b64, &payload_b64);
    let signature = keypair.sign(&input);
    Ok(format!("{}.{}", input.as_str(), signature.to_base64url()))
}

/// A split and parsed compact JWS. The signature has not been checked.
#[derive(Debug, Clone)]
pub struct DecodedToken {
    /// Parsed protected header.
    pub header: JwsHeader,
    /// Parsed payload.
    pub payload: Value,
    /// The bytes the signature covers.
    pub signing_input: SigningInput,
    /// The signature.
    pub signature: Ed25519Signature,
}

impl DecodedToken {
    /// Check the signature against `public_key`.
    pub fn verify(&self, public_key: &Ed25519PublicKey) -> Result<(), CryptoError> {
        if self.header.alg != ALG_EDDSA {
            return Err(CryptoError::UnsupportedAlgorithm(self.header.alg.clone()));
        }
        ed25519::verify(&self.signing_input, &self.signature, public_key)
    }
}

/// Split a compact JWS and parse its header and payload.
pub fn decode_compact(token: &str) -> Result<DecodedToken, CryptoError> {
    let mut parts = token.trim().split('.');
    let (Some(header_b64), Some(payload_b64), Some(signature_b64), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(CryptoError::MalformedToken(
            "expected three dot-separated parts".into(),
        ));
    };
    if header_b64.is_empty() || signature_b64.is_empty() {
        return Err(CryptoError::MalformedToken("empty token part".into()));
    }

    let header: JwsHeader = serde_json::from_slice(&decode_part(header_b64, "header")?)
        .map_err(|e| CryptoError::MalformedToken(format!("header is not valid JSON: {e}")))?;
    let payload: Value = serde_json::from_slice(&decode_part(payload_b64, "payload")?)
        .map_err(|e| CryptoError::MalformedToken(format!("payload is not valid JSON: {e}")))?;
    let signature = Ed25519Signature::from_base64url(signature_b64)?;
    tracing::debug!(alg = %header.alg, kid = ?header.kid, "decoded signature token");

    Ok(DecodedToken {
        header,
        payload,
        signing_input: SigningInput::from_parts(header_b64, payload_b64),
        signature,
    })
}

fn decode_part(part: &str, what: &str) -> Result<Vec<u8>, CryptoError> {
    URL_SAFE_NO_PAD
        .decode(part)
        .map_err(|e| CryptoError::MalformedToken(format!("{what} is not base64url: {e}")))
}
