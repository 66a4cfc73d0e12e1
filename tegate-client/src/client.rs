//! The upstream client: cache, rate gate and fetcher composed.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument};

use tegate_cache::ResponseCache;
use tegate_core::config::ProxyConfig;
use tegate_core::error::Result;
use tegate_core::traits::UpstreamSource;
use tegate_core::types::QueryParams;

use crate::canonical::canonical_url;
use crate::fetcher::Fetcher;
use crate::gate::RateGate;
use crate::retry::RetryPolicy;

/// Cached, rate-gated access to the Trading Economics API.
///
/// Per logical request:
/// 1. Build the canonical URL and look it up in the cache
/// 2. On a hit, return it; the gate and network are not touched
/// 3. On a miss, wait on the gate once, then fetch (retries included)
/// 4. Cache the body on success; return errors without caching
///
/// Build one per process and share it (e.g. behind an `Arc`); every clone
/// of that `Arc` sees the same gate and cache.
#[derive(Debug)]
pub struct UpstreamClient {
    base_url: String,
    api_key: String,
    cache: ResponseCache,
    gate: RateGate,
    fetcher: Fetcher,
}

impl UpstreamClient {
    /// Creates a client with the default retry policy.
    pub fn new(config: ProxyConfig) -> Result<Self> {
        Self::with_retry_policy(config, RetryPolicy::default())
    }

    /// Creates a client with a custom retry policy.
    pub fn with_retry_policy(config: ProxyConfig, policy: RetryPolicy) -> Result<Self> {
        let fetcher = Fetcher::new(config.timeout, policy)?;
        Ok(Self::from_parts(config, fetcher))
    }

    /// Creates a client around an existing fetcher.
    pub fn from_parts(config: ProxyConfig, fetcher: Fetcher) -> Self {
        Self {
            cache: ResponseCache::new(config.cache_ttl),
            gate: RateGate::new(config.min_interval),
            base_url: config.base_url,
            api_key: config.api_key,
            fetcher,
        }
    }

    /// The response cache.
    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// The rate gate.
    pub fn gate(&self) -> &RateGate {
        &self.gate
    }

    /// Canonical URL (and cache key) for a request.
    pub fn url_for(&self, path: &str, query: &QueryParams) -> Result<String> {
        canonical_url(&self.base_url, &self.api_key, path, query)
    }

    /// Fetches `path` with the given passthrough query.
    #[instrument(skip(self, query))]
    pub async fn request(&self, path: &str, query: &QueryParams) -> Result<Value> {
        let url = self.url_for(path, query)?;

        if let Some(value) = self.cache.get(&url) {
            debug!("Cache hit");
            return Ok(value);
        }

        debug!("Cache miss, fetching");
        self.gate.acquire().await;

        let value = self.fetcher.fetch(&url).await?;
        self.cache.put(url, value.clone());
        Ok(value)
    }
}

#[async_trait]
impl UpstreamSource for UpstreamClient {
    async fn request(&self, path: &str, query: &QueryParams) -> Result<Value> {
        UpstreamClient::request(self, path, query).await
    }

    fn cached_entries(&self) -> usize {
        self.cache.len()
    }

    fn fresh_entries(&self) -> usize {
        self.cache.stats().fresh_entries
    }
}
