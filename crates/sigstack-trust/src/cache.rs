//! # Trusted Key Cache
//!
//! Holds the most recently fetched [`TrustedKeyList`] and refetches it from
//! a [`RegistrySource`] when it is older than `max_age`.
//!
//! The lock guards only the snapshot swap. It is never held across an
//! `.await`, so concurrent lookups that both find the list stale will both
//! fetch; the last one to finish wins. Fetch errors are returned to the
//! caller as-is: no retry, and no fallback to a stale list.

use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::config::TrustConfig;
use crate::error::TrustError;
use crate::registry::{HttpRegistrySource, RegistrySource, TrustedKeyList};

/// Source of the current time, injectable for tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug)]
struct Snapshot {
    list: Arc<TrustedKeyList>,
    fetched_at: DateTime<Utc>,
}

/// A lazily populated, periodically refreshed trusted key list.
pub struct TrustedKeyCache<S, C = SystemClock> {
    source: S,
    clock: C,
    max_age: chrono::Duration,
    snapshot: RwLock<Option<Snapshot>>,
}

impl<S: RegistrySource> TrustedKeyCache<S, SystemClock> {
    /// A cache over `source` using wall-clock time.
    pub fn new(source: S, max_age: chrono::Duration) -> Self {
        Self::with_clock(source, SystemClock, max_age)
    }
}

impl<S: RegistrySource, C: Clock> TrustedKeyCache<S, C> {
    /// A cache over `source` using `clock` to judge staleness.
    pub fn with_clock(source: S, clock: C, max_age: chrono::Duration) -> Self {
        Self {
            source,
            clock,
            max_age,
            snapshot: RwLock::new(None),
        }
    }

    /// The current list, fetching first if it is missing or stale.
    pub async fn trusted_keys(&self) -> Result<Arc<TrustedKeyList>, TrustError> {
        if let Some(list) = self.fresh() {
            tracing::debug!(keys = list.len(), "trusted key list cache hit");
            return Ok(list);
        }
        self.refresh().await
    }

    /// Fetch the list now, regardless of age.
    pub async fn refresh(&self) -> Result<Arc<TrustedKeyList>, TrustError> {
        let list = Arc::new(self.source.fetch().await?);
        let fetched_at = self.clock.now();
        *self.snapshot.write() = Some(Snapshot {
            list: Arc::clone(&list),
            fetched_at,
        });
        tracing::info!(keys = list.len(), %fetched_at, "refreshed trusted key list");
        Ok(list)
    }

    /// Whether `fingerprint` is on the trusted list.
    ///
    /// `None` is never trusted and does not trigger a fetch.
    pub async fn is_trusted(&self, fingerprint: Option<&str>) -> Result<bool, TrustError> {
        let Some(fingerprint) = fingerprint else {
            return Ok(false);
        };
        Ok(self.trusted_keys().await?.contains(fingerprint))
    }

    /// Drop the cached list; the next lookup fetches.
    pub fn invalidate(&self) {
        *self.snapshot.write() = None;
    }

    /// The cached list, fresh or not, without any I/O.
    pub fn cached(&self) -> Option<Arc<TrustedKeyList>> {
        self.snapshot.read().as_ref().map(|s| Arc::clone(&s.list))
    }

    /// When the cached list was fetched.
    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.snapshot.read().as_ref().map(|s| s.fetched_at)
    }

    pub fn max_age(&self) -> chrono::Duration {
        self.max_age
    }

    fn fresh(&self) -> Option<Arc<TrustedKeyList>> {
        let now = self.clock.now();
        self.snapshot
            .read()
            .as_ref()
            .filter(|s| now - s.fetched_at < self.max_age)
            .map(|s| Arc::clone(&s.list))
    }
}

impl TrustedKeyCache<HttpRegistrySource> {
    /// Build a cache reading the configured HTTP registries.
    pub fn from_config(config: &TrustConfig) -> Result<Self, TrustError> {
        Ok(Self::new(
            HttpRegistrySource::from_config(config)?,
            config.max_age,
        ))
    }

    /// The process-wide cache, configured from [`TrustConfig::global()`] on
    /// first use.
    pub fn global() -> Arc<Self> {
        static GLOBAL: OnceLock<Arc<TrustedKeyCache<HttpRegistrySource>>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| {
            let config = TrustConfig::global();
            let source = HttpRegistrySource::from_config(config).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "could not build registry client, using defaults");
                HttpRegistrySource::with_client(
                    reqwest::Client::default(),
                    config.registry_urls.clone(),
                )
                .with_timeout(config.timeout())
            });
            Arc::new(Self::new(source, config.max_age))
        }))
    }
}

impl<S, C> std::fmt::Debug for TrustedKeyCache<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.snapshot.read();
        f.debug_struct("TrustedKeyCache")
            .field("max_age", &self.max_age)
            .field("keys", &snapshot.as_ref().map(|s| s.list.len()))
            .field("fetched_at", &snapshot.as_ref().map(|s| s.fetched_at))
            .finish_non_exhaustive()
    }
}
