//! DTOs for API responses.

use serde::Serialize;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status
    pub status: String,
    /// Current server time (RFC 3339, UTC)
    pub time: String,
    /// Version
    pub version: String,
    /// Uptime in seconds
    pub uptime_seconds: u64,
    /// Responses currently cached, stale ones included
    pub cached_entries: usize,
    /// Cached responses still within their TTL
    pub fresh_entries: usize,
}
