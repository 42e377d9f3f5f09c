//! # Document Hashing: Tamper-Evidence Fingerprints
//!
//! Defines `HashInfo`, `HashAlgorithm` and [`hash_document()`], the
//! fingerprint embedded in every signature payload and recomputed by the
//! verifier.
//!
//! ## Invariant
//!
//! The digest is always computed over a `CanonicalString`, never over raw
//! `serde_json::to_string()` output, so key order and whitespace can never
//! influence the result.
//!
//! ## Reserved keys
//!
//! Documents stored in a resource server carry bookkeeping fields at the top
//! level (`_id`, `_meta`, `_rev`) that change without the content changing.
//! By default these are stripped before hashing; set
//! [`HashOptions::keep_reserved_keys`] to hash them as well.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::canonical::CanonicalString;

/// Top-level fields excluded from hashing unless `keep_reserved_keys` is set.
pub const RESERVED_KEYS: [&str; 3] = ["_id", "_meta", "_rev"];

/// The hash algorithm used to fingerprint a document.
///
/// Serialized with the upper-case names used in signature payloads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashAlgorithm {
    /// SHA-256, hex encoded.
    #[default]
    #[serde(rename = "SHA256")]
    Sha256,
}

impl HashAlgorithm {
    /// Returns the algorithm identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256 => "SHA256",
        }
    }
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An algorithm-tagged digest of a document's canonical form.
///
/// Serializes as `{"alg": "SHA256", "hash": "<64 hex chars>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HashInfo {
    /// The algorithm that produced `hash`. Defaults to SHA-256 when absent.
    #[serde(default)]
    pub alg: HashAlgorithm,
    /// Lowercase hex digest.
    pub hash: String,
}

impl HashInfo {
    /// Returns true if both the algorithm and the digest are equal.
    pub fn matches(&self, other: &HashInfo) -> bool {
        self.alg == other.alg && self.hash == other.hash
    }
}

impl std::fmt::Display for HashInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.alg, self.hash)
    }
}

/// Options controlling [`hash_document()`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HashOptions {
    /// Hash the reserved top-level keys (`_id`, `_meta`, `_rev`) too.
    pub keep_reserved_keys: bool,
    /// Digest algorithm.
    pub algorithm: HashAlgorithm,
}

impl HashOptions {
    /// Options that keep the reserved keys in the hashed content.
    pub fn keeping_reserved_keys() -> Self {
        Self {
            keep_reserved_keys: true,
            ..Self::default()
        }
    }
}

/// Compute the fingerprint of a document.
///
/// Strips the reserved top-level keys (unless told to keep them), serializes
/// the result canonically and digests it. Pure: no I/O, no side effects.
pub fn hash_document(doc: &Value, options: &HashOptions) -> HashInfo {
    let canonical = match doc {
        Value::Object(map) if !options.keep_reserved_keys => {
            let stripped: serde_json::Map<String, Value> = map
                .iter()
                .filter(|(k, _)| !RESERVED_KEYS.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            CanonicalString::from_value(&Value::Object(stripped))
        }
        other => CanonicalString::from_value(other),
    };
    tracing::debug!(serialized = canonical.as_str(), "hashing canonical document");
    digest_canonical(&canonical, options.algorithm)
}

/// Digest canonical text with the given algorithm.
pub fn digest_canonical(data: &CanonicalString, algorithm: HashAlgorithm) -> HashInfo {
    let hash = match algorithm {
        HashAlgorithm::Sha256 => sha256_hex(data),
    };
    HashInfo {
        alg: algorithm,
        hash,
    }
}

/// Compute a SHA-256 hex string from canonical text.
pub fn sha256_hex(data: &CanonicalString) -> String {
    Sha256::digest(data.as_bytes())
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn hash_is_always_64_hex(
            entries in prop::collection::btree_map("[a-z_]{1,8}", any::<i64>(), 0..10)
        ) {
            let map: serde_json::Map<String, Value> = entries
                .into_iter()
                .map(|(k, v)| (k, serde_json::json!(v)))
                .collect();
            let info = hash_document(&Value::Object(map), &HashOptions::default());
            prop_assert_eq!(info.hash.len(), 64);
            prop_assert!(info.hash.chars().all(|c| c.is_ascii_hexdigit()));
        }

        #[test]
        fn reserved_keys_never_affect_default_hash(
            id in "[a-z0-9/]{0,20}",
            rev in any::<u32>(),
        ) {
            let base = serde_json::json!({"content": "same"});
            let mut with_reserved = base.clone();
            with_reserved["_id"] = serde_json::json!(id);
            with_reserved["_rev"] = serde_json::json!(rev);
            prop_assert_eq!(
                hash_document(&base, &HashOptions::default()),
                hash_document(&with_reserved, &HashOptions::default())
            );
        }
    }
}
