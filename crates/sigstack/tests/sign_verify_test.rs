//! End-to-end signing and verification with an in-memory trusted list.

use std::sync::Arc;

use serde_json::{json, Value};
use sigstack::{
    hash_document, pop_signature, push_signature, sign, HashOptions, SignOptions,
    SignatureError, SignerInfo, Verifier, VerifyOptions,
};
use sigstack_crypto::{encode_compact, Ed25519KeyPair, Jwk, JwsHeader, KeyMaterial};
use sigstack_trust::{
    EmbeddedKeyResolver, StaticRegistrySource, SystemClock, TrustedKeyCache, TrustedKeyList,
};

type TestVerifier = Verifier<EmbeddedKeyResolver, StaticRegistrySource, SystemClock>;

fn verifier_trusting(keys: &[&Ed25519KeyPair]) -> TestVerifier {
    let fingerprints = keys
        .iter()
        .map(|kp| Jwk::from_public_key(&kp.public_key(), None).thumbprint().unwrap());
    let source = StaticRegistrySource::new(TrustedKeyList::from_fingerprints(fingerprints));
    let cache = TrustedKeyCache::new(source, chrono::Duration::hours(24));
    Verifier::with_parts(EmbeddedKeyResolver, Arc::new(cache))
}

fn material(kp: &Ed25519KeyPair) -> KeyMaterial {
    KeyMaterial::from(kp)
}

// ── Walkthrough ──────────────────────────────────────────────────────

#[tokio::test]
async fn sign_and_verify_single_key_document() {
    let kp = Ed25519KeyPair::generate();
    let doc = json!({"key1": "hello"});

    let signed = sign(&doc, Some(&material(&kp)), &SignOptions::default()).unwrap();
    assert_eq!(signed["signatures"].as_array().unwrap().len(), 1);

    let report = verifier_trusting(&[])
        .verify(&signed, &VerifyOptions::default())
        .await
        .unwrap();
    assert!(!report.trusted);
    assert!(report.valid);
    assert!(report.unchanged);
    assert_eq!(report.original, json!({"key1": "hello"}));
    assert_eq!(
        report.payload["hashinfo"]["hash"],
        "0aced6a895ea008233b8ec61e6164f4395d32fb2467e8d6c619c077637a2b000"
    );
}

#[tokio::test]
async fn trusted_signer_passes_strict_policy() {
    let kp = Ed25519KeyPair::generate();
    let doc = json!({"audit": {"score": 97, "passed": true}});
    let options = SignOptions {
        signer: Some(SignerInfo::new("Auditor").with_url("https://auditor.example")),
        signature_type: Some("transcription".into()),
        ..Default::default()
    };
    let signed = sign(&doc, Some(&material(&kp)), &options).unwrap();

    let report = verifier_trusting(&[&kp])
        .verify(&signed, &VerifyOptions::default())
        .await
        .unwrap();
    assert!(report.trusted && report.valid && report.unchanged);
    assert!(report.details.is_empty(), "{:?}", report.details);
    let payload = report.signature_payload().unwrap();
    assert_eq!(payload.signer.unwrap().name, "Auditor");
    assert_eq!(payload.signature_type.as_deref(), Some("transcription"));

    assert_eq!(report.into_verified(&VerifyOptions::default()).unwrap(), doc);
}

// ── Trust gating ─────────────────────────────────────────────────────

#[tokio::test]
async fn valid_but_unlisted_key_is_untrusted() {
    let signer = Ed25519KeyPair::generate();
    let listed = Ed25519KeyPair::generate();
    let signed = sign(&json!({"a": 1}), Some(&material(&signer)), &SignOptions::default()).unwrap();

    let report = verifier_trusting(&[&listed])
        .verify(&signed, &VerifyOptions::default())
        .await
        .unwrap();
    assert!(report.valid);
    assert!(!report.trusted);
    assert!(report
        .details
        .iter()
        .any(|d| d.contains("not on the trusted list")));

    let strict = VerifyOptions::default();
    let lenient = VerifyOptions {
        allow_untrusted: true,
        ..Default::default()
    };
    assert!(report.is_acceptable(&lenient));
    assert!(matches!(
        report.into_verified(&strict),
        Err(SignatureError::Untrusted)
    ));
}

// ── Tamper detection ─────────────────────────────────────────────────

#[tokio::test]
async fn modified_content_is_detected() {
    let kp = Ed25519KeyPair::generate();
    let signed = sign(
        &json!({"a": 1, "nested": {"b": [1, 2, 3]}}),
        Some(&material(&kp)),
        &SignOptions::default(),
    )
    .unwrap();
    let verifier = verifier_trusting(&[&kp]);

    let mut changed_value = signed.clone();
    changed_value["a"] = json!(2);
    let mut added_key = signed.clone();
    added_key["extra"] = json!(true);
    let mut nested = signed.clone();
    nested["nested"]["b"][0] = json!(9);

    for tampered in [changed_value, added_key, nested] {
        let report = verifier.verify(&tampered, &VerifyOptions::default()).await.unwrap();
        assert!(report.valid);
        assert!(!report.unchanged);
        assert!(matches!(
            report.into_verified(&VerifyOptions::default()),
            Err(SignatureError::ContentModified)
        ));
    }
}

#[tokio::test]
async fn key_order_and_reserved_keys_do_not_count_as_changes() {
    let kp = Ed25519KeyPair::generate();
    let signed = sign(
        &json!({"a": 1, "b": 2}),
        Some(&material(&kp)),
        &SignOptions::default(),
    )
    .unwrap();

    let mut stored = json!({"_id": "resources/1", "_rev": 7, "b": 2, "a": 1});
    stored["signatures"] = signed["signatures"].clone();

    let report = verifier_trusting(&[&kp])
        .verify(&stored, &VerifyOptions::default())
        .await
        .unwrap();
    assert!(report.unchanged);

    let keep = VerifyOptions {
        hash: HashOptions::keeping_reserved_keys(),
        ..Default::default()
    };
    let report = verifier_trusting(&[&kp]).verify(&stored, &keep).await.unwrap();
    assert!(!report.unchanged);
}

#[tokio::test]
async fn forged_signature_is_invalid() {
    let kp = Ed25519KeyPair::generate();
    let signed = sign(&json!({"a": 1}), Some(&material(&kp)), &SignOptions::default()).unwrap();
    let token = signed["signatures"][0].as_str().unwrap();

    let (body, sig) = token.rsplit_once('.').unwrap();
    let flipped = if sig.starts_with('A') { "B" } else { "A" };
    let forged = format!("{body}.{flipped}{}", &sig[1..]);
    let doc = json!({"a": 1, "signatures": [forged]});

    let report = verifier_trusting(&[&kp])
        .verify(&doc, &VerifyOptions::default())
        .await
        .unwrap();
    assert!(!report.valid);
    assert!(report.trusted);
    assert!(report.unchanged);
    assert!(matches!(
        report.into_verified(&VerifyOptions::default()),
        Err(SignatureError::InvalidSignature)
    ));
}

#[tokio::test]
async fn foreign_payload_shapes_still_compare_hashes() {
    let kp = Ed25519KeyPair::generate();
    let doc = json!({"key1": "hello"});
    let hash = hash_document(&doc, &HashOptions::default()).hash;
    let mut header = JwsHeader::eddsa();
    header.jwk = Some(Jwk::from_public_key(&kp.public_key(), None));

    for payload in [
        json!({"version": 2, "hashinfo": {"alg": "SHA256", "hash": hash}}),
        json!({"iat": 1.5, "hashinfo": {"alg": "SHA256", "hash": hash}}),
        json!({"hashinfo": {"hash": hash}}),
    ] {
        let token = encode_compact(&header, &payload, &kp).unwrap();
        let signed = push_signature(&doc, &token).unwrap();

        let report = verifier_trusting(&[&kp])
            .verify(&signed, &VerifyOptions::default())
            .await
            .unwrap();
        assert!(report.valid && report.trusted, "{payload}: {:?}", report.details);
        assert!(report.unchanged, "{payload}: {:?}", report.details);
        assert!(report.details.is_empty(), "{payload}: {:?}", report.details);
        assert_eq!(report.payload, payload);
        assert_eq!(
            report.signature_payload().unwrap().hashinfo.unwrap().hash,
            hash
        );
    }
}

// ── Stacking ─────────────────────────────────────────────────────────

#[tokio::test]
async fn stacked_signatures_verify_top_first() {
    let first = Ed25519KeyPair::generate();
    let second = Ed25519KeyPair::generate();
    let doc = json!({"shipment": "pallet-7"});

    let once = sign(&doc, Some(&material(&first)), &SignOptions::default()).unwrap();
    let twice = sign(&once, Some(&material(&second)), &SignOptions::default()).unwrap();
    assert_eq!(twice["signatures"].as_array().unwrap().len(), 2);

    let verifier = verifier_trusting(&[&second]);
    let top = verifier.verify(&twice, &VerifyOptions::default()).await.unwrap();
    assert!(top.trusted && top.valid && top.unchanged);
    assert_eq!(top.original, once);

    let chain = verifier.verify_chain(&twice, &VerifyOptions::default()).await.unwrap();
    assert_eq!(chain.len(), 2);
    assert!(chain[0].trusted);
    assert!(!chain[1].trusted);
    assert!(chain.iter().all(|r| r.valid && r.unchanged));
    assert_eq!(chain[1].original, doc);

    assert_eq!(pop_signature(&pop_signature(&twice)), doc);
}

// ── Errors ───────────────────────────────────────────────────────────

#[tokio::test]
async fn unsigned_documents_are_rejected() {
    let verifier = verifier_trusting(&[]);
    for doc in [json!({"a": 1}), json!({"signatures": []}), json!([1, 2]), Value::Null] {
        assert!(matches!(
            verifier.verify(&doc, &VerifyOptions::default()).await,
            Err(SignatureError::NoSignature)
        ));
    }
    assert!(matches!(
        verifier.verify_chain(&json!({}), &VerifyOptions::default()).await,
        Err(SignatureError::NoSignature)
    ));
}

#[tokio::test]
async fn malformed_tokens_are_rejected() {
    let verifier = verifier_trusting(&[]);
    for sig in [json!("not-a-jws"), json!(42), json!("a.b.c")] {
        let doc = json!({"a": 1, "signatures": [sig]});
        assert!(matches!(
            verifier.verify(&doc, &VerifyOptions::default()).await,
            Err(SignatureError::MalformedToken(_))
        ));
    }
}

#[tokio::test]
async fn jku_token_without_network_resolver_reports_details() {
    let kp = Ed25519KeyPair::generate();
    let options = SignOptions {
        header: sigstack::SignHeader {
            jku: Some("https://keys.example/jwks.json".into()),
            kid: Some("k1".into()),
            ..Default::default()
        },
        ..Default::default()
    };
    let signed = sign(&json!({"a": 1}), Some(&material(&kp)), &options).unwrap();

    let report = verifier_trusting(&[&kp])
        .verify(&signed, &VerifyOptions::default())
        .await
        .unwrap();
    assert!(!report.valid);
    assert!(!report.trusted);
    assert!(report.unchanged);
    assert!(report
        .details
        .iter()
        .any(|d| d.contains("could not resolve signing key")));
}
