//! # Verification
//!
//! Inspects the most recent signature on a document and reports three
//! independent facts about it:
//!
//! - `valid`: the token's signature checks out against its public key.
//! - `trusted`: that key's thumbprint is on the trusted list.
//! - `unchanged`: the document minus this signature still hashes to the
//!   `hashinfo` recorded in the token.
//!
//! None of these being false is an error. Errors are reserved for documents
//! with nothing to inspect ([`SignatureError::NoSignature`],
//! [`SignatureError::MalformedToken`]) and for failing to fetch the trusted
//! list ([`SignatureError::Trust`]). Problems resolving the signer's key are
//! recorded in `details` and leave `valid` false.
//!
//! [`VerificationReport::into_verified()`] turns a report into the strict
//! pass/fail answer.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use sigstack_core::{hash_document, latest_signature, pop_signature, signature_count, HashOptions};
use sigstack_crypto::{decode_compact, Jwk, JwsHeader};
use sigstack_trust::{
    Clock, HttpKeyResolver, HttpRegistrySource, KeyResolver, RegistrySource, SystemClock,
    TrustedKeyCache,
};

use crate::error::SignatureError;
use crate::payload::SignaturePayload;

/// Options for [`verify`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerifyOptions {
    /// Accept signatures from keys that are not on the trusted list.
    pub allow_untrusted: bool,
    /// Must match the options the document was signed with.
    pub hash: HashOptions,
}

/// The outcome of inspecting one signature.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationReport {
    pub trusted: bool,
    pub valid: bool,
    pub unchanged: bool,
    /// The token payload exactly as signed.
    pub payload: Value,
    pub header: JwsHeader,
    /// The document with the inspected signature removed.
    pub original: Value,
    /// Human-readable reasons for any false result.
    pub details: Vec<String>,
}

impl VerificationReport {
    /// The payload read as a [`SignaturePayload`], or `None` if it is not
    /// a JSON object.
    pub fn signature_payload(&self) -> Option<SignaturePayload> {
        if !self.payload.is_object() {
            return None;
        }
        serde_json::from_value(self.payload.clone()).ok()
    }

    /// Whether the report passes the policy in `options`.
    pub fn is_acceptable(&self, options: &VerifyOptions) -> bool {
        self.valid && self.unchanged && (self.trusted || options.allow_untrusted)
    }

    /// The original document if the report passes, else the first failure.
    ///
    /// Checked in order: trust (unless allowed), signature, content.
    pub fn into_verified(self, options: &VerifyOptions) -> Result<Value, SignatureError> {
        if !self.trusted && !options.allow_untrusted {
            return Err(SignatureError::Untrusted);
        }
        if !self.valid {
            return Err(SignatureError::InvalidSignature);
        }
        if !self.unchanged {
            return Err(SignatureError::ContentModified);
        }
        Ok(self.original)
    }
}

/// Verifies signatures using a key resolver and a trusted key cache.
pub struct Verifier<R = HttpKeyResolver, S = HttpRegistrySource, C = SystemClock> {
    resolver: R,
    cache: Arc<TrustedKeyCache<S, C>>,
}

impl Default for Verifier {
    /// Resolves `jku` over HTTP and uses the process-wide trusted key cache.
    fn default() -> Self {
        Self::with_parts(HttpKeyResolver::default(), TrustedKeyCache::global())
    }
}

impl<R: KeyResolver, S: RegistrySource, C: Clock> Verifier<R, S, C> {
    pub fn with_parts(resolver: R, cache: Arc<TrustedKeyCache<S, C>>) -> Self {
        Self { resolver, cache }
    }

    pub fn cache(&self) -> &Arc<TrustedKeyCache<S, C>> {
        &self.cache
    }

    /// Inspect the most recent signature on `doc`.
    pub async fn verify(
        &self,
        doc: &Value,
        options: &VerifyOptions,
    ) -> Result<VerificationReport, SignatureError> {
        let token = latest_signature(doc).ok_or(SignatureError::NoSignature)?;
        let token = token.as_str().ok_or_else(|| {
            SignatureError::MalformedToken("top signature is not a string".into())
        })?;
        let decoded =
            decode_compact(token).map_err(|e| SignatureError::MalformedToken(e.to_string()))?;

        let mut details = Vec::new();

        let jwk = match self.resolver.resolve(&decoded.header).await {
            Ok(jwk) => Some(jwk),
            Err(e) => {
                details.push(format!("could not resolve signing key: {e}"));
                None
            }
        };

        let valid = match &jwk {
            Some(jwk) => match jwk.ed25519_public_key().and_then(|pk| decoded.verify(&pk)) {
                Ok(()) => true,
                Err(e) => {
                    details.push(e.to_string());
                    false
                }
            },
            None => false,
        };

        let fingerprint = jwk.as_ref().and_then(|jwk| fingerprint(jwk, &mut details));
        let trusted = self.cache.is_trusted(fingerprint.as_deref()).await?;
        if fingerprint.is_some() && !trusted {
            details.push("signing key is not on the trusted list".into());
        }

        let original = pop_signature(doc);
        let unchanged = match signed_hash(&decoded.payload) {
            Some(signed) => {
                let current = hash_document(&original, &options.hash);
                let same = current.hash == signed;
                if !same {
                    details.push(format!(
                        "document hash {} does not match signed hash {signed}",
                        current.hash
                    ));
                }
                same
            }
            None => {
                details.push("token carries no hashinfo".into());
                false
            }
        };

        tracing::debug!(
            trusted,
            valid,
            unchanged,
            kid = decoded.header.kid.as_deref(),
            "verified top signature"
        );

        Ok(VerificationReport {
            trusted,
            valid,
            unchanged,
            payload: decoded.payload,
            header: decoded.header,
            original,
            details,
        })
    }

    /// Inspect every signature, most recent first.
    ///
    /// Each report's `original` is the document the next report inspects.
    pub async fn verify_chain(
        &self,
        doc: &Value,
        options: &VerifyOptions,
    ) -> Result<Vec<VerificationReport>, SignatureError> {
        let mut reports = Vec::with_capacity(signature_count(doc));
        let mut current = doc.clone();
        while signature_count(&current) > 0 {
            let report = self.verify(&current, options).await?;
            current = report.original.clone();
            reports.push(report);
        }
        if reports.is_empty() {
            return Err(SignatureError::NoSignature);
        }
        Ok(reports)
    }
}

impl<R, S, C> std::fmt::Debug for Verifier<R, S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Verifier").finish_non_exhaustive()
    }
}

/// `hashinfo.hash` from a token payload. Other payload members are not
/// consulted.
fn signed_hash(payload: &Value) -> Option<&str> {
    payload.get("hashinfo")?.get("hash")?.as_str()
}

fn fingerprint(jwk: &Jwk, details: &mut Vec<String>) -> Option<String> {
    match jwk.thumbprint() {
        Ok(fp) => Some(fp),
        Err(e) => {
            details.push(format!("cannot fingerprint signing key: {e}"));
            None
        }
    }
}

/// Inspect the most recent signature on `doc` with the default verifier.
pub async fn verify(
    doc: &Value,
    options: &VerifyOptions,
) -> Result<VerificationReport, SignatureError> {
    Verifier::default().verify(doc, options).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn report(trusted: bool, valid: bool, unchanged: bool) -> VerificationReport {
        VerificationReport {
            trusted,
            valid,
            unchanged,
            payload: Value::Null,
            header: JwsHeader::eddsa(),
            original: json!({"a": 1}),
            details: Vec::new(),
        }
    }

    #[test]
    fn policy_accepts_all_true() {
        let opts = VerifyOptions::default();
        assert!(report(true, true, true).is_acceptable(&opts));
        assert_eq!(report(true, true, true).into_verified(&opts).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn policy_rejects_untrusted_unless_allowed() {
        let strict = VerifyOptions::default();
        let lenient = VerifyOptions {
            allow_untrusted: true,
            ..Default::default()
        };
        assert!(!report(false, true, true).is_acceptable(&strict));
        assert!(report(false, true, true).is_acceptable(&lenient));
        assert!(matches!(
            report(false, true, true).into_verified(&strict),
            Err(SignatureError::Untrusted)
        ));
        assert!(report(false, true, true).into_verified(&lenient).is_ok());
    }

    #[test]
    fn policy_failure_order() {
        let opts = VerifyOptions::default();
        assert!(matches!(
            report(false, false, false).into_verified(&opts),
            Err(SignatureError::Untrusted)
        ));
        assert!(matches!(
            report(true, false, false).into_verified(&opts),
            Err(SignatureError::InvalidSignature)
        ));
        assert!(matches!(
            report(true, true, false).into_verified(&opts),
            Err(SignatureError::ContentModified)
        ));
    }

    #[test]
    fn report_serializes_for_output() {
        let val = serde_json::to_value(report(false, true, true)).unwrap();
        assert_eq!(val["valid"], true);
        assert_eq!(val["trusted"], false);
        assert_eq!(val["header"]["alg"], "EdDSA");
        assert!(val["payload"].is_null());
    }

    #[test]
    fn signed_hash_ignores_other_members() {
        let payload = json!({"version": 2, "iat": 1.5, "hashinfo": {"hash": "abc"}});
        assert_eq!(signed_hash(&payload), Some("abc"));
        assert_eq!(signed_hash(&json!({"hashinfo": {"hash": 7}})), None);
        assert_eq!(signed_hash(&json!("text")), None);
    }

    #[test]
    fn typed_payload_view_is_lenient() {
        let mut r = report(true, true, true);
        assert!(r.signature_payload().is_none());
        r.payload = json!({"version": 2, "signer": {"name": "Auditor"}});
        let typed = r.signature_payload().unwrap();
        assert!(typed.version.is_none());
        assert_eq!(typed.signer.unwrap().name, "Auditor");
    }
}
