//! Common traits for tegate.
//!
//! Route handlers only see `UpstreamSource`, so they can be exercised
//! against a stub without the rate gate or a network.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::types::QueryParams;

/// Anything that can answer a logical upstream request.
///
/// Implementations might use:
/// - The cached, rate-gated HTTP pipeline (production)
/// - A canned response table (tests)
#[async_trait]
pub trait UpstreamSource: Send + Sync {
    /// Fetches `path` (e.g. `/indicators`) with the given passthrough query.
    ///
    /// Returns the parsed body on success. Failures are returned unchanged
    /// so the caller can map them to a response.
    async fn request(&self, path: &str, query: &QueryParams) -> Result<Value>;

    /// Number of responses currently held in cache, for health reporting.
    fn cached_entries(&self) -> usize {
        0
    }

    /// Number of cached responses still within their TTL.
    fn fresh_entries(&self) -> usize {
        0
    }
}
