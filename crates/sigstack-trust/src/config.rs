//! Trusted-key registry configuration.
//!
//! Defaults point at the public trellis trusted list. Override through
//! environment variables or explicit construction for private registries
//! and tests.

use std::sync::OnceLock;
use std::time::Duration as StdDuration;

use url::Url;

/// Public trusted list used when no registry is configured.
pub const DEFAULT_TRUSTED_LIST_URL: &str =
    "https://raw.githubusercontent.com/trellisfw/trusted-list/master/keys.json";

/// Refresh interval for the trusted list, in seconds (24 hours).
pub const DEFAULT_MAX_AGE_SECS: i64 = 24 * 60 * 60;

/// Per-request HTTP timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const ENV_URLS: &str = "SIGSTACK_TRUSTED_LIST_URLS";
const ENV_MAX_AGE: &str = "SIGSTACK_TRUSTED_LIST_MAX_AGE_SECS";
const ENV_TIMEOUT: &str = "SIGSTACK_HTTP_TIMEOUT_SECS";

/// Where trusted keys come from and how long a fetched list stays fresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustConfig {
    /// Registry documents to merge into the trusted list.
    pub registry_urls: Vec<Url>,
    /// A cached list older than this is refetched.
    pub max_age: chrono::Duration,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for TrustConfig {
    fn default() -> Self {
        Self {
            registry_urls: Url::parse(DEFAULT_TRUSTED_LIST_URL).into_iter().collect(),
            max_age: chrono::Duration::seconds(DEFAULT_MAX_AGE_SECS),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl TrustConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `SIGSTACK_TRUSTED_LIST_URLS` comma-separated registry URLs
    ///   (default: the trellis trusted list)
    /// - `SIGSTACK_TRUSTED_LIST_MAX_AGE_SECS` (default: 86400)
    /// - `SIGSTACK_HTTP_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// The process-wide configuration, read from the environment on first
    /// use. Invalid variables are logged and the defaults used instead.
    pub fn global() -> &'static TrustConfig {
        static GLOBAL: OnceLock<TrustConfig> = OnceLock::new();
        GLOBAL.get_or_init(|| {
            Self::from_env().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "invalid trust configuration, using defaults");
                Self::default()
            })
        })
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_URLS) {
            config.registry_urls = parse_urls(ENV_URLS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_MAX_AGE) {
            let secs: i64 = parse_number(ENV_MAX_AGE, &raw)?;
            config.max_age = chrono::Duration::try_seconds(secs)
                .filter(|d| *d >= chrono::Duration::zero())
                .ok_or_else(|| {
                    ConfigError::InvalidValue(ENV_MAX_AGE.to_string(), format!("{secs} out of range"))
                })?;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT) {
            config.timeout_secs = parse_number(ENV_TIMEOUT, &raw)?;
        }
        Ok(config)
    }

    /// Request timeout as a std duration, for the HTTP client.
    pub fn timeout(&self) -> StdDuration {
        StdDuration::from_secs(self.timeout_secs)
    }
}

fn parse_urls(var: &str, raw: &str) -> Result<Vec<Url>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| Url::parse(s).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string())))
        .collect()
}

fn parse_number<T: std::str::FromStr>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidValue(var.to_string(), e.to_string()))
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),
}
