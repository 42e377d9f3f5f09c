//! Cryptographic error types.

use thiserror::Error;

/// Error in cryptographic operations.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Key generation, parsing, or conversion failed.
    #[error("key error: {0}")]
    KeyError(String),

    /// A token could not be split or decoded into header and payload.
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// The token names an algorithm this crate does not implement.
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Token construction failed.
    #[error("signing failed: {0}")]
    SigningFailed(String),

    /// Signature verification failed.
    #[error("signature verification failed: {0}")]
    VerificationFailed(String),

    /// JSON encoding of a header or payload failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
