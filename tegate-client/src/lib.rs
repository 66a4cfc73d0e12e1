//! # tegate client
//!
//! The shared fetch pipeline in front of the Trading Economics API:
//!
//! 1. Build the canonical URL ([`canonical_url`]) and use it as the cache key
//! 2. Serve fresh cache hits without touching the network
//! 3. Otherwise wait on the process-wide [`RateGate`]
//! 4. Fetch with [`Fetcher`], retrying 409/429/5xx with capped exponential backoff
//! 5. Cache successful bodies; propagate failures unchanged
//!
//! ## Example
//!
//! ```rust,ignore
//! use tegate_client::UpstreamClient;
//! use tegate_core::{ProxyConfig, QueryParams};
//!
//! let client = UpstreamClient::new(ProxyConfig::from_env())?;
//! let gdp = client
//!     .request("/historical/country/united%20states/indicator/gdp", &QueryParams::new())
//!     .await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod canonical;
mod client;
mod fetcher;
mod gate;
mod retry;

pub use canonical::{canonical_url, encode_segment};
pub use client::UpstreamClient;
pub use fetcher::{parse_body, Fetcher};
pub use gate::RateGate;
pub use retry::{classify, Classification, RetryAttempt, RetryPolicy};
