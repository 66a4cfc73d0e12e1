//! Proxy configuration.

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::constants::{
    DEFAULT_API_KEY, DEFAULT_BASE_URL, DEFAULT_CACHE_TTL_SECS, DEFAULT_MIN_INTERVAL_MS,
    DEFAULT_TIMEOUT_SECS,
};

/// Settings shared by every route that talks to upstream.
///
/// One value of `min_interval` applies to all routes, since upstream
/// meters the key globally.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Upstream base URL, without a trailing slash
    pub base_url: String,
    /// API key sent as the `c` parameter
    pub api_key: String,
    /// Minimum spacing between outbound calls
    pub min_interval: Duration,
    /// How long a successful response is served from cache
    pub cache_ttl: Duration,
    /// HTTP timeout for a single attempt
    pub timeout: Duration,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            api_key: DEFAULT_API_KEY.into(),
            min_interval: Duration::from_millis(DEFAULT_MIN_INTERVAL_MS),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ProxyConfig {
    /// Loads configuration from the environment (and `.env`, if present).
    ///
    /// Reads `TE_BASE_URL`, `TE_API_KEY`, `TE_RATE_MS`, `TE_CACHE_TTL_SEC`
    /// and `TE_TIMEOUT_SEC`.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. Missing keys take the
    /// default; unparseable numbers are logged and take the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("TE_BASE_URL")
            .filter(|v| !v.trim().is_empty())
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.into());

        let api_key = lookup("TE_API_KEY")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_KEY.into());

        let rate_ms: u64 = parse_or(&lookup, "TE_RATE_MS", DEFAULT_MIN_INTERVAL_MS);
        let ttl_secs: u64 = parse_or(&lookup, "TE_CACHE_TTL_SEC", DEFAULT_CACHE_TTL_SECS);
        let timeout_secs: u64 = parse_or(&lookup, "TE_TIMEOUT_SEC", DEFAULT_TIMEOUT_SECS);

        Self {
            base_url,
            api_key,
            min_interval: Duration::from_millis(rate_ms),
            cache_ttl: Duration::from_secs(ttl_secs),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Points the config at another upstream (useful for mocks).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the minimum spacing between outbound calls.
    pub fn with_min_interval(mut self, min_interval: Duration) -> Self {
        self.min_interval = min_interval;
        self
    }

    /// Sets the cache TTL.
    pub fn with_cache_ttl(mut self, cache_ttl: Duration) -> Self {
        self.cache_ttl = cache_ttl;
        self
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Copy + std::fmt::Display,
{
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, default = %default, "Ignoring unparseable setting");
            default
        }),
    }
}
