//! # Trusted-Key Registries
//!
//! A registry is a JSON document listing public keys whose signatures are
//! considered trusted, shaped like a JWK set:
//!
//! ```json
//! { "keys": [ { "kty": "OKP", "crv": "Ed25519", "x": "...", "kid": "..." } ] }
//! ```
//!
//! Keys are identified by their RFC 7638 thumbprint, so two registries that
//! list the same key with different `kid`s or extra members agree on it.
//!
//! [`RegistrySource`] is the seam the cache fetches through.
//! [`HttpRegistrySource`] merges any number of registry URLs;
//! [`StaticRegistrySource`] serves a fixed list for tests and pinned
//! deployments.

use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sigstack_crypto::{thumbprint, JwkSet};
use url::Url;

use crate::config::{TrustConfig, DEFAULT_TIMEOUT_SECS};
use crate::error::TrustError;

/// The set of trusted key fingerprints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrustedKeyList {
    fingerprints: BTreeSet<String>,
}

impl TrustedKeyList {
    /// An empty list: nothing is trusted.
    pub fn new() -> Self {
        Self::default()
    }

    /// A list of already-computed fingerprints.
    pub fn from_fingerprints<I, S>(fingerprints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fingerprints: fingerprints.into_iter().map(Into::into).collect(),
        }
    }

    /// Fingerprint every key in a JWK set.
    ///
    /// Entries whose thumbprint cannot be computed are skipped with a
    /// warning.
    pub fn from_jwk_set(set: &JwkSet) -> Self {
        let mut list = Self::new();
        for (index, key) in set.keys.iter().enumerate() {
            match thumbprint(key) {
                Ok(fp) => {
                    list.fingerprints.insert(fp);
                }
                Err(e) => {
                    tracing::warn!(index, error = %e, "skipping registry entry without a usable thumbprint");
                }
            }
        }
        list
    }

    /// Add every fingerprint of `other`.
    pub fn merge(&mut self, other: TrustedKeyList) {
        self.fingerprints.extend(other.fingerprints);
    }

    /// Returns true if the fingerprint is trusted.
    pub fn contains(&self, fingerprint: &str) -> bool {
        self.fingerprints.contains(fingerprint)
    }

    /// Number of trusted keys.
    pub fn len(&self) -> usize {
        self.fingerprints.len()
    }

    /// Returns true if nothing is trusted.
    pub fn is_empty(&self) -> bool {
        self.fingerprints.is_empty()
    }

    /// Iterate fingerprints in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.fingerprints.iter().map(String::as_str)
    }
}

/// Where the trusted key list comes from.
#[async_trait]
pub trait RegistrySource: Send + Sync {
    /// Fetch the complete current list.
    async fn fetch(&self) -> Result<TrustedKeyList, TrustError>;
}

/// A registry source that always returns the same list.
#[derive(Debug, Clone, Default)]
pub struct StaticRegistrySource {
    list: TrustedKeyList,
}

impl StaticRegistrySource {
    pub fn new(list: TrustedKeyList) -> Self {
        Self { list }
    }
}

#[async_trait]
impl RegistrySource for StaticRegistrySource {
    async fn fetch(&self) -> Result<TrustedKeyList, TrustError> {
        Ok(self.list.clone())
    }
}

/// Fetches registry documents over HTTP and merges them.
#[derive(Debug, Clone)]
pub struct HttpRegistrySource {
    http: reqwest::Client,
    urls: Vec<Url>,
    timeout: Duration,
}

impl HttpRegistrySource {
    /// Build a source with its own HTTP client from configuration.
    pub fn from_config(config: &TrustConfig) -> Result<Self, TrustError> {
        let http = build_client(config)?;
        let source = Self::with_client(http, config.registry_urls.clone());
        Ok(source.with_timeout(config.timeout()))
    }

    /// Build a source sharing an existing HTTP client.
    pub fn with_client(http: reqwest::Client, urls: Vec<Url>) -> Self {
        Self {
            http,
            urls,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The registry URLs this source reads.
    pub fn urls(&self) -> &[Url] {
        &self.urls
    }

    async fn fetch_one(&self, url: &Url) -> Result<TrustedKeyList, TrustError> {
        let body = get_json(&self.http, url.as_str(), self.timeout).await?;
        let set = parse_key_set(body).map_err(|reason| TrustError::InvalidRegistry {
            url: url.to_string(),
            reason,
        })?;
        Ok(TrustedKeyList::from_jwk_set(&set))
    }
}

#[async_trait]
impl RegistrySource for HttpRegistrySource {
    async fn fetch(&self) -> Result<TrustedKeyList, TrustError> {
        let mut merged = TrustedKeyList::new();
        for url in &self.urls {
            let list = self.fetch_one(url).await?;
            tracing::debug!(%url, keys = list.len(), "fetched trusted key registry");
            merged.merge(list);
        }
        Ok(merged)
    }
}

/// Build the HTTP client used for registry and `jku` requests.
pub fn build_client(config: &TrustConfig) -> Result<reqwest::Client, TrustError> {
    reqwest::Client::builder()
        .timeout(config.timeout())
        .build()
        .map_err(|e| TrustError::Http {
            url: "client_init".into(),
            source: e,
        })
}

/// GET `url` and parse the body as JSON, mapping failures to [`TrustError`].
///
/// `timeout` applies per request, whatever the client was built with.
pub(crate) async fn get_json(
    http: &reqwest::Client,
    url: &str,
    timeout: Duration,
) -> Result<Value, TrustError> {
    let resp = http.get(url).timeout(timeout).send().await.map_err(|e| TrustError::Http {
        url: url.to_string(),
        source: e,
    })?;

    if !resp.status().is_success() {
        return Err(TrustError::Status {
            url: url.to_string(),
            status: resp.status().as_u16(),
        });
    }

    let bytes = resp.bytes().await.map_err(|e| TrustError::Http {
        url: url.to_string(),
        source: e,
    })?;
    serde_json::from_slice(&bytes).map_err(|e| TrustError::InvalidRegistry {
        url: url.to_string(),
        reason: format!("body is not JSON: {e}"),
    })
}

/// Accept `{"keys": [...]}` or a bare array of keys.
pub(crate) fn parse_key_set(body: Value) -> Result<JwkSet, String> {
    match body {
        Value::Array(keys) => Ok(JwkSet { keys }),
        Value::Object(mut obj) => match obj.remove("keys") {
            Some(Value::Array(keys)) => Ok(JwkSet { keys }),
            Some(_) => Err("'keys' is not an array".into()),
            None => Err("missing 'keys' member".into()),
        },
        _ => Err("expected a JWK set object".into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sigstack_crypto::{Ed25519KeyPair, Jwk};

    fn jwk_value(kp: &Ed25519KeyPair, kid: &str) -> Value {
        serde_json::to_value(Jwk::from_public_key(&kp.public_key(), Some(kid.into()))).unwrap()
    }

    #[test]
    fn from_jwk_set_fingerprints_keys() {
        let kp = Ed25519KeyPair::generate();
        let set = JwkSet {
            keys: vec![jwk_value(&kp, "a")],
        };
        let list = TrustedKeyList::from_jwk_set(&set);
        let expected = Jwk::from_public_key(&kp.public_key(), None).thumbprint().unwrap();
        assert_eq!(list.len(), 1);
        assert!(list.contains(&expected));
    }

    #[test]
    fn unusable_entries_are_skipped() {
        let kp = Ed25519KeyPair::generate();
        let set = JwkSet {
            keys: vec![json!({"kty": "OKP"}), json!("junk"), jwk_value(&kp, "ok")],
        };
        assert_eq!(TrustedKeyList::from_jwk_set(&set).len(), 1);
    }

    #[test]
    fn same_key_under_two_kids_counts_once() {
        let kp = Ed25519KeyPair::generate();
        let set = JwkSet {
            keys: vec![jwk_value(&kp, "one"), jwk_value(&kp, "two")],
        };
        assert_eq!(TrustedKeyList::from_jwk_set(&set).len(), 1);
    }

    #[test]
    fn merge_unions_fingerprints() {
        let mut a = TrustedKeyList::from_fingerprints(["x", "y"]);
        a.merge(TrustedKeyList::from_fingerprints(["y", "z"]));
        assert_eq!(a.iter().collect::<Vec<_>>(), vec!["x", "y", "z"]);
    }

    #[test]
    fn empty_list_trusts_nothing() {
        let list = TrustedKeyList::new();
        assert!(list.is_empty());
        assert!(!list.contains("anything"));
    }

    #[test]
    fn parse_key_set_shapes() {
        assert_eq!(parse_key_set(json!({"keys": [1, 2]})).unwrap().len(), 2);
        assert_eq!(parse_key_set(json!([1])).unwrap().len(), 1);
        assert!(parse_key_set(json!({"keys": "nope"})).is_err());
        assert!(parse_key_set(json!({"other": []})).is_err());
        assert!(parse_key_set(json!(42)).is_err());
    }

    #[tokio::test]
    async fn static_source_returns_its_list() {
        let source = StaticRegistrySource::new(TrustedKeyList::from_fingerprints(["fp"]));
        let list = source.fetch().await.unwrap();
        assert!(list.contains("fp"));
    }
}
