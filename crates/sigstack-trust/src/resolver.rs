//! Locating a token's public key from its header.
//!
//! A token either embeds its signer's public key (`jwk`) or points at a JWK
//! set (`jku`) and names the key within it (`kid`). An embedded key wins
//! when both are present.

use std::time::Duration;

use async_trait::async_trait;
use sigstack_crypto::{Jwk, JwsHeader};

use crate::config::{TrustConfig, DEFAULT_TIMEOUT_SECS};
use crate::error::TrustError;
use crate::registry::{build_client, get_json, parse_key_set};

/// Finds the public key a token was signed with.
#[async_trait]
pub trait KeyResolver: Send + Sync {
    /// Resolve the header's key locator to a public JWK.
    async fn resolve(&self, header: &JwsHeader) -> Result<Jwk, TrustError>;
}

/// Accepts only embedded keys. Never touches the network.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedKeyResolver;

#[async_trait]
impl KeyResolver for EmbeddedKeyResolver {
    async fn resolve(&self, header: &JwsHeader) -> Result<Jwk, TrustError> {
        embedded(header).ok_or_else(|| {
            TrustError::NoKeyLocator("header has no embedded jwk and jku lookups are disabled".into())
        })
    }
}

/// Resolves embedded keys directly and `jku` + `kid` by fetching the set.
#[derive(Debug, Clone)]
pub struct HttpKeyResolver {
    http: reqwest::Client,
    timeout: Duration,
}

impl HttpKeyResolver {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Build a resolver with its own client, honoring the configured timeout.
    pub fn from_config(config: &TrustConfig) -> Result<Self, TrustError> {
        Ok(Self::new(build_client(config)?).with_timeout(config.timeout()))
    }

    /// Set the per-request timeout for `jku` fetches.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for HttpKeyResolver {
    /// Configured from [`TrustConfig::global()`].
    fn default() -> Self {
        let config = TrustConfig::global();
        Self::from_config(config).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "could not build key resolver client, using defaults");
            Self::new(reqwest::Client::default()).with_timeout(config.timeout())
        })
    }
}

#[async_trait]
impl KeyResolver for HttpKeyResolver {
    async fn resolve(&self, header: &JwsHeader) -> Result<Jwk, TrustError> {
        if let Some(jwk) = embedded(header) {
            return Ok(jwk);
        }
        let Some(jku) = header.jku.as_deref() else {
            return Err(TrustError::NoKeyLocator("header has neither jwk nor jku".into()));
        };
        let Some(kid) = header.kid.as_deref() else {
            return Err(TrustError::NoKeyLocator(format!("jku {jku} given without kid")));
        };

        tracing::debug!(jku, kid, "fetching signing key set");
        let set = parse_key_set(get_json(&self.http, jku, self.timeout).await?).map_err(|reason| {
            TrustError::InvalidRegistry {
                url: jku.to_string(),
                reason,
            }
        })?;
        match set.find(kid) {
            Some(Ok(jwk)) => Ok(jwk.to_public()),
            Some(Err(e)) => Err(TrustError::InvalidRegistry {
                url: jku.to_string(),
                reason: format!("key {kid:?} is not a valid JWK: {e}"),
            }),
            None => Err(TrustError::KeyNotFound {
                jku: jku.to_string(),
                kid: kid.to_string(),
            }),
        }
    }
}

fn embedded(header: &JwsHeader) -> Option<Jwk> {
    header.jwk.as_ref().map(Jwk::to_public)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigstack_crypto::Ed25519KeyPair;

    #[tokio::test]
    async fn embedded_key_is_returned_public() {
        let kp = Ed25519KeyPair::generate();
        let mut header = JwsHeader::eddsa();
        header.jwk = Some(Jwk::from_keypair(&kp, None));
        let jwk = EmbeddedKeyResolver.resolve(&header).await.unwrap();
        assert!(!jwk.is_private());
        assert_eq!(jwk.ed25519_public_key().unwrap(), kp.public_key());
    }

    #[tokio::test]
    async fn embedded_resolver_refuses_jku() {
        let mut header = JwsHeader::eddsa();
        header.jku = Some("https://keys.example/jwks.json".into());
        header.kid = Some("k".into());
        assert!(matches!(
            EmbeddedKeyResolver.resolve(&header).await,
            Err(TrustError::NoKeyLocator(_))
        ));
    }

    #[tokio::test]
    async fn jku_without_kid_is_rejected_before_fetch() {
        let mut header = JwsHeader::eddsa();
        header.jku = Some("http://127.0.0.1:9/never-fetched".into());
        assert!(matches!(
            HttpKeyResolver::default().resolve(&header).await,
            Err(TrustError::NoKeyLocator(_))
        ));
    }

    #[tokio::test]
    async fn bare_header_has_no_locator() {
        assert!(matches!(
            HttpKeyResolver::default().resolve(&JwsHeader::eddsa()).await,
            Err(TrustError::NoKeyLocator(_))
        ));
    }
}
