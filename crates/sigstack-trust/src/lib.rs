//! # sigstack-trust: Who Signed, and Do We Trust Them
//!
//! Everything on the verification path that needs I/O:
//!
//! - [`KeyResolver`]: find a token's public key, embedded or via `jku`.
//! - [`RegistrySource`]: fetch the list of trusted key fingerprints.
//! - [`TrustedKeyCache`]: hold that list and refresh it when stale.
//!
//! Configuration comes from [`TrustConfig`], loadable from the environment.

pub mod cache;
pub mod config;
pub mod error;
pub mod registry;
pub mod resolver;

pub use cache::{Clock, SystemClock, TrustedKeyCache};
pub use config::{ConfigError, TrustConfig, DEFAULT_TRUSTED_LIST_URL};
pub use error::TrustError;
pub use registry::{
    build_client, HttpRegistrySource, RegistrySource, StaticRegistrySource, TrustedKeyList,
};
pub use resolver::{EmbeddedKeyResolver, HttpKeyResolver, KeyResolver};
