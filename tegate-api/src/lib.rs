//! # tegate API server
//!
//! HTTP front for the tegate fetch pipeline. Handlers only validate query
//! parameters and map them to upstream paths; caching, rate limiting and
//! retries live in `tegate-client`.
//!
//! ## Endpoints
//!
//! - `GET /health` - Liveness and cache size
//! - `GET /api/historical?country=&indicator=` - Full indicator history
//! - `GET /api/historical/range?country=&indicator=&start=&end=` - History between two dates
//! - `GET /api/indicators` - Snapshot indicators (query passed through)
//! - `GET /api/calendar` - Calendar events (query passed through)
//!
//! ## Example
//!
//! ```rust,ignore
//! use tegate_api::ApiServer;
//! use tegate_core::ProxyConfig;
//!
//! let server = ApiServer::new(ProxyConfig::from_env())?;
//! server.run(([0, 0, 0, 0], 3000)).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod dto;
mod error;
mod handlers;
mod routes;
mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use tegate_core::{ProxyConfig, Result};

/// API server for tegate.
pub struct ApiServer {
    state: Arc<AppState>,
}

impl ApiServer {
    /// Creates a server backed by a fresh upstream client.
    pub fn new(config: ProxyConfig) -> Result<Self> {
        Ok(Self::with_state(Arc::new(AppState::new(config)?)))
    }

    /// Creates a server around existing state.
    pub fn with_state(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Creates the router with all routes configured.
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        create_router(self.state.clone())
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    /// Runs the server on the given address.
    pub async fn run(self, addr: impl Into<SocketAddr>) -> std::io::Result<()> {
        let addr = addr.into();
        let listener = tokio::net::TcpListener::bind(addr).await?;

        info!(
            %addr,
            upstream = %self.state.config.base_url,
            min_interval_ms = self.state.config.min_interval.as_millis() as u64,
            cache_ttl_secs = self.state.config.cache_ttl.as_secs(),
            "tegate listening"
        );

        axum::serve(listener, self.router()).await
    }
}
