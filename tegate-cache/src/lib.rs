//! TTL cache for upstream responses.
//!
//! Memory-only; entries are keyed by the canonical request URL and expire
//! lazily on read.

mod cache;

pub use cache::{CacheStats, ResponseCache};
