//! # sigstack-core: Foundational Types for sigstack
//!
//! The leaf of the workspace: everything needed to fingerprint a JSON
//! document and manage its stack of signature tokens, with no cryptography
//! and no I/O.
//!
//! ## Key Design Principles
//!
//! 1. **`CanonicalString` newtype.** All hashing flows through the canonical
//!    serializer. No raw `serde_json::to_string()` for digests.
//!
//! 2. **Explicit hashing options.** Reserved-key stripping and the digest
//!    algorithm are carried in [`HashOptions`], defaulting to stripping
//!    `_id` / `_meta` / `_rev` and SHA-256.
//!
//! 3. **Immutable stack updates.** [`push_signature()`] and
//!    [`pop_signature()`] return new owned documents.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `sigstack-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod stack;

// Re-export primary types for ergonomic imports.
pub use canonical::{serialize, CanonicalString};
pub use digest::{hash_document, HashAlgorithm, HashInfo, HashOptions, RESERVED_KEYS};
pub use error::{CanonicalizationError, DocumentError};
pub use stack::{
    latest_signature, pop_signature, push_signature, signature_count, signatures,
    SIGNATURES_KEY,
};
