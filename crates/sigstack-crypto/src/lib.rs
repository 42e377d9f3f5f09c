//! # sigstack-crypto: Keys and Tokens
//!
//! Ed25519 key handling, OKP JSON Web Keys with RFC 7638 thumbprints, and
//! compact EdDSA JWS encoding.
//!
//! ## Crate Policy
//!
//! - Depends only on `sigstack-core` internally (for the canonical
//!   serializer used by thumbprints).
//! - No I/O. Key lookup over the network lives in `sigstack-trust`.
//! - Private keys never appear in `Debug` output.

pub mod ed25519;
pub mod error;
pub mod jwk;
pub mod jws;
pub mod key;

pub use ed25519::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
pub use error::CryptoError;
pub use jwk::{thumbprint, Jwk, JwkSet, ALG_EDDSA, CRV_ED25519, KTY_OKP};
pub use jws::{decode_compact, encode_compact, DecodedToken, JwsHeader, SigningInput, TYP_JWT};
pub use key::KeyMaterial;
