//! Errors from registry fetches and key resolution.

use thiserror::Error;

use crate::config::ConfigError;

/// Failure to obtain trusted keys or a signer's public key.
#[derive(Error, Debug)]
pub enum TrustError {
    /// The request could not be sent or the response body could not be read.
    #[error("HTTP request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// The response was not a usable key registry or JWK set.
    #[error("invalid key registry at {url}: {reason}")]
    InvalidRegistry { url: String, reason: String },

    /// The JWK set at `jku` has no key with the requested `kid`.
    #[error("no key with kid {kid:?} in JWK set at {jku}")]
    KeyNotFound { jku: String, kid: String },

    /// The token header does not say where its key can be found.
    #[error("cannot locate signing key: {0}")]
    NoKeyLocator(String),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}
