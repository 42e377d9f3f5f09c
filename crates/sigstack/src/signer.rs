//! # Signing
//!
//! Appends a signature token to a document's `signatures` stack.
//!
//! The token payload carries the document's [`HashInfo`] as it is at signing
//! time, including any signatures already on the stack, so each token vouches
//! for everything beneath it.
//!
//! ## Key locator
//!
//! A verifier has to find the public key. The header carries one of:
//!
//! - an explicit `jwk` from [`SignHeader::jwk`] (private members stripped),
//! - `jku` + `kid`, both required, `jku` a valid URL,
//! - otherwise the public JWK derived from the signing key.

use serde::Serialize;
use serde_json::Value;
use sigstack_core::{hash_document, push_signature, HashInfo, HashOptions};
use sigstack_crypto::{
    encode_compact, CryptoError, Ed25519KeyPair, Jwk, JwsHeader, KeyMaterial, ALG_EDDSA, TYP_JWT,
};

use crate::error::SignatureError;
use crate::payload::{SignaturePayload, SignerInfo};

/// Header parameters requested by the caller.
#[derive(Debug, Clone, Default)]
pub struct SignHeader {
    /// Public key to embed. Takes precedence over `jku`.
    pub jwk: Option<Jwk>,
    /// URL of a JWK set holding the public key. Requires `kid`.
    pub jku: Option<String>,
    pub kid: Option<String>,
    /// Must be `EdDSA` when given.
    pub alg: Option<String>,
    /// Defaults to `JWT`.
    pub typ: Option<String>,
    pub kty: Option<String>,
}

/// Options for [`sign`].
#[derive(Debug, Clone, Default)]
pub struct SignOptions {
    pub signer: Option<SignerInfo>,
    /// Recorded as `type` in the payload.
    pub signature_type: Option<String>,
    pub header: SignHeader,
    pub hash: HashOptions,
}

/// Turns a header and payload into a token with a resolved key.
pub trait TokenSigner: Send + Sync {
    fn sign_token(
        &self,
        header: &JwsHeader,
        payload: &SignaturePayload,
        key: &Ed25519KeyPair,
    ) -> Result<String, CryptoError>;
}

/// Compact EdDSA JWS.
#[derive(Debug, Clone, Copy, Default)]
pub struct JwsSigner;

impl TokenSigner for JwsSigner {
    fn sign_token(
        &self,
        header: &JwsHeader,
        payload: &SignaturePayload,
        key: &Ed25519KeyPair,
    ) -> Result<String, CryptoError> {
        encode_compact(header, payload, key)
    }
}

/// Signs documents with a pluggable token primitive.
#[derive(Debug, Clone, Default)]
pub struct Signer<T = JwsSigner> {
    token_signer: T,
}

impl Signer<JwsSigner> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T: TokenSigner> Signer<T> {
    pub fn with_token_signer(token_signer: T) -> Self {
        Self { token_signer }
    }

    /// Sign `doc` and return a copy with the new token pushed on its stack.
    ///
    /// `doc` itself is left untouched.
    pub fn sign(
        &self,
        doc: &Value,
        key: Option<&KeyMaterial>,
        options: &SignOptions,
    ) -> Result<Value, SignatureError> {
        let key = key.ok_or_else(|| {
            SignatureError::MissingKeyMaterial("a private key is required to sign".into())
        })?;
        let keypair = key
            .keypair()
            .map_err(|e| SignatureError::MissingKeyMaterial(e.to_string()))?;

        let hashinfo = hash_document(doc, &options.hash);
        let header = build_header(&options.header, key, &keypair)?;
        let payload = build_payload(hashinfo, options);

        let token = self
            .token_signer
            .sign_token(&header, &payload, &keypair)
            .map_err(|e| SignatureError::SigningFailure(e.to_string()))?;

        let signed = push_signature(doc, &token)?;
        tracing::info!(
            kid = header.kid.as_deref().unwrap_or("-"),
            jku = header.jku.as_deref().unwrap_or("-"),
            signatures = sigstack_core::signature_count(&signed),
            "signed document"
        );
        Ok(signed)
    }

    /// Sign any serializable value, treated as its JSON form.
    pub fn sign_serializable(
        &self,
        doc: &impl Serialize,
        key: Option<&KeyMaterial>,
        options: &SignOptions,
    ) -> Result<Value, SignatureError> {
        let value = serde_json::to_value(doc)
            .map_err(|e| SignatureError::Serialization(e.into()))?;
        self.sign(&value, key, options)
    }
}

/// Sign `doc` with the default JWS signer.
///
/// ```
/// use serde_json::json;
/// use sigstack::{sign, SignOptions};
/// use sigstack_crypto::{Ed25519KeyPair, KeyMaterial};
///
/// let key = KeyMaterial::from(&Ed25519KeyPair::generate());
/// let signed = sign(&json!({"key1": "hello"}), Some(&key), &SignOptions::default()).unwrap();
/// assert_eq!(signed["signatures"].as_array().unwrap().len(), 1);
/// ```
pub fn sign(
    doc: &Value,
    key: Option<&KeyMaterial>,
    options: &SignOptions,
) -> Result<Value, SignatureError> {
    Signer::new().sign(doc, key, options)
}

fn build_payload(hashinfo: HashInfo, options: &SignOptions) -> SignaturePayload {
    let mut payload = SignaturePayload::new(hashinfo, chrono::Utc::now().timestamp());
    payload.signer = options.signer.clone();
    payload.signature_type = options.signature_type.clone();
    payload
}

fn build_header(
    requested: &SignHeader,
    key: &KeyMaterial,
    keypair: &Ed25519KeyPair,
) -> Result<JwsHeader, SignatureError> {
    let alg = requested.alg.as_deref().unwrap_or(ALG_EDDSA);
    if alg != ALG_EDDSA {
        return Err(SignatureError::SigningFailure(format!(
            "unsupported algorithm {alg}, only {ALG_EDDSA} is available"
        )));
    }

    let kid = requested
        .kid
        .clone()
        .or_else(|| key.as_jwk().and_then(|jwk| jwk.kid.clone()));

    let mut header = JwsHeader::eddsa();
    header.typ = Some(requested.typ.clone().unwrap_or_else(|| TYP_JWT.to_string()));
    header.kty = requested.kty.clone();

    if let Some(jwk) = &requested.jwk {
        header.jwk = Some(jwk.to_public());
    } else if let Some(jku) = &requested.jku {
        url::Url::parse(jku).map_err(|e| {
            SignatureError::MissingKeyMaterial(format!("jku {jku:?} is not a valid URL: {e}"))
        })?;
        if kid.is_none() {
            return Err(SignatureError::MissingKeyMaterial(
                "a jku header requires a kid to select the key".into(),
            ));
        }
        header.jku = Some(jku.clone());
    } else {
        header.jwk = Some(Jwk::from_public_key(&keypair.public_key(), kid.clone()));
    }

    header.kid = kid;
    Ok(header)
}
