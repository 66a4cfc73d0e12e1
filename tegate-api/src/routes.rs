//! API route configuration.

use std::sync::Arc;

use axum::{routing::get, Router};

use crate::handlers;
use crate::state::AppState;

/// Creates the API router with all routes configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))

        // Historical series
        .route("/api/historical", get(handlers::historical))
        .route("/api/historical/range", get(handlers::historical_range))

        // Snapshots and events
        .route("/api/indicators", get(handlers::indicators))
        .route("/api/calendar", get(handlers::calendar))

        .fallback(handlers::not_found)
        .with_state(state)
}
