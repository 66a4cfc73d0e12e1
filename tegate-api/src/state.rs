//! App state: config and the shared upstream source.

use std::sync::Arc;
use std::time::Instant;

use tegate_client::UpstreamClient;
use tegate_core::{ProxyConfig, Result, UpstreamSource};

/// State shared by every handler.
///
/// Holds the single upstream source for the process, so all routes share
/// one rate gate and one cache.
pub struct AppState {
    /// Settings the upstream source was built from
    pub config: ProxyConfig,
    /// Fetch pipeline the handlers call into
    pub upstream: Arc<dyn UpstreamSource>,
    /// When the state was created, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    /// Builds the production pipeline from `config`.
    pub fn new(config: ProxyConfig) -> Result<Self> {
        let client = UpstreamClient::new(config.clone())?;
        Ok(Self::with_upstream(config, Arc::new(client)))
    }

    /// Uses an existing upstream source.
    pub fn with_upstream(config: ProxyConfig, upstream: Arc<dyn UpstreamSource>) -> Self {
        Self {
            config,
            upstream,
            started_at: Instant::now(),
        }
    }
}
