//! # sigstack: Stacked Signatures for JSON Documents
//!
//! Sign a JSON document by appending a compact EdDSA JWS to its
//! `signatures` array; verify the most recent one against the document as it
//! was before that signature was added.
//!
//! ```no_run
//! use serde_json::json;
//! use sigstack::{sign, verify, SignOptions, VerifyOptions};
//! use sigstack_crypto::{Ed25519KeyPair, KeyMaterial};
//!
//! # async fn demo() -> Result<(), sigstack::SignatureError> {
//! let key = KeyMaterial::from(&Ed25519KeyPair::generate());
//! let signed = sign(&json!({"key1": "hello"}), Some(&key), &SignOptions::default())?;
//!
//! let report = verify(&signed, &VerifyOptions::default()).await?;
//! assert!(report.valid && report.unchanged);
//! assert_eq!(report.original, json!({"key1": "hello"}));
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate layout
//!
//! | Crate | Role |
//! |-------|------|
//! | `sigstack-core` | canonical serializer, document hashing, stack ops |
//! | `sigstack-crypto` | Ed25519, JWK, compact JWS |
//! | `sigstack-trust` | trusted-key registry, cache, `jku` resolution |
//! | `sigstack` | this crate: signer, verifier, policy |

pub mod error;
pub mod payload;
pub mod signer;
pub mod verifier;

pub use error::SignatureError;
pub use payload::{SignaturePayload, SignerInfo};
pub use signer::{sign, JwsSigner, SignHeader, SignOptions, Signer, TokenSigner};
pub use verifier::{verify, VerificationReport, Verifier, VerifyOptions};

pub use sigstack_core::{
    hash_document, pop_signature, push_signature, serialize, HashAlgorithm, HashInfo, HashOptions,
};
pub use sigstack_crypto::KeyMaterial;
