//! The signing and verification error taxonomy.

use sigstack_core::{CanonicalizationError, DocumentError};
use sigstack_trust::TrustError;
use thiserror::Error;

/// Errors from [`sign`](crate::sign) and [`verify`](crate::verify).
///
/// A verification that completes with `trusted`, `valid` or `unchanged`
/// false is not an error: those outcomes are reported in the
/// [`VerificationReport`](crate::VerificationReport). The last three
/// variants are produced only by
/// [`VerificationReport::into_verified()`](crate::VerificationReport::into_verified).
#[derive(Error, Debug)]
pub enum SignatureError {
    /// The document has no signature to verify.
    #[error("document has no signatures")]
    NoSignature,

    /// No usable private key, or no way for a verifier to find the public one.
    #[error("missing key material: {0}")]
    MissingKeyMaterial(String),

    /// The top signature is not a decodable compact JWS.
    #[error("malformed signature token: {0}")]
    MalformedToken(String),

    /// The token could not be produced.
    #[error("signing failed: {0}")]
    SigningFailure(String),

    /// The document could not be represented as JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[from] CanonicalizationError),

    /// The document cannot carry a signature stack.
    #[error("invalid document: {0}")]
    Document(#[from] DocumentError),

    /// The trusted key list could not be fetched.
    #[error("trusted key lookup failed: {0}")]
    Trust(#[from] TrustError),

    /// The signature is valid but the signer is not on the trusted list.
    #[error("signature is valid but the signer is not on the trusted list")]
    Untrusted,

    /// The signature does not verify.
    #[error("signature cannot be verified")]
    InvalidSignature,

    /// The signature is valid but the document changed after signing.
    #[error("signature is valid but the document was modified after signing")]
    ContentModified,
}
