//! The claims carried inside every signature token.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use sigstack_core::HashInfo;

/// Who produced a signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerInfo {
    /// Display name of the signer.
    pub name: String,
    /// Homepage of the signer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl SignerInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// Token payload.
///
/// Everything but `hashinfo` is informational. Known fields decode
/// leniently: a field that is missing or has an unexpected shape reads as
/// `None`, so tokens from other producers always decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignaturePayload {
    /// Version of the library that produced the token.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Issued-at, seconds since the epoch.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Fingerprint of the document as it was when signed.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub hashinfo: Option<HashInfo>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub signer: Option<SignerInfo>,

    /// Kind of signature, e.g. `transcription`.
    #[serde(
        rename = "type",
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub signature_type: Option<String>,

    /// Claims this library does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SignaturePayload {
    /// A payload stamped with this library's version and the given time.
    pub fn new(hashinfo: HashInfo, iat: i64) -> Self {
        Self {
            version: Some(env!("CARGO_PKG_VERSION").to_string()),
            iat: Some(iat),
            hashinfo: Some(hashinfo),
            signer: None,
            signature_type: None,
            extra: Map::new(),
        }
    }
}

/// Decode `T`, or `None` if the value has another shape.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}
