//! # tegate core
//!
//! Shared building blocks for the tegate proxy, a rate-limited and caching
//! front for the Trading Economics API.
//!
//! - **Errors**: the tagged `ProxyError` taxonomy every layer propagates
//! - **Constants**: upstream defaults and the backoff schedule
//! - **Config**: `ProxyConfig`, loaded from the environment
//! - **Types**: `QueryParams`, the passthrough query mapping
//! - **Traits**: `UpstreamSource`, the seam route handlers call into
//!
//! ## Example
//!
//! ```rust
//! use tegate_core::{ProxyConfig, QueryParams};
//!
//! let config = ProxyConfig::default();
//! assert_eq!(config.cache_ttl.as_secs(), 900);
//!
//! let query = QueryParams::new().with("country", "japan");
//! assert_eq!(query.get("country"), Some("japan"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod config;
pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

pub use config::ProxyConfig;
pub use error::{ProxyError, Result};
pub use traits::UpstreamSource;
pub use types::QueryParams;
