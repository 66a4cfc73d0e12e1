//! API route handlers.
//!
//! Each handler turns the inbound query into an upstream path plus
//! passthrough parameters and hands them to the shared upstream source.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{NaiveDate, SecondsFormat, Utc};
use serde_json::Value;
use tracing::debug;

use tegate_client::encode_segment;
use tegate_core::{ProxyError, QueryParams};

use crate::dto::HealthResponse;
use crate::error::ApiError;
use crate::state::AppState;

type Result<T> = std::result::Result<T, ApiError>;

const DATE_FORMAT: &str = "%Y-%m-%d";

fn invalid(message: impl Into<String>) -> ApiError {
    ProxyError::Validation(message.into()).into()
}

/// Treats absent and empty parameters alike.
fn required<'a>(params: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    params.get(key).map(String::as_str).filter(|v| !v.is_empty())
}

fn historical_path(country: &str, indicator: &str) -> String {
    format!(
        "/historical/country/{}/indicator/{}",
        encode_segment(country),
        encode_segment(indicator)
    )
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| {
        invalid(format!("{field} must be a date in YYYY-MM-DD format"))
    })
}

/// GET /api/historical
pub async fn historical(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>> {
    let (Some(country), Some(indicator)) =
        (required(&params, "country"), required(&params, "indicator"))
    else {
        return Err(invalid("country & indicator required"));
    };

    let path = historical_path(country, indicator);
    debug!(%path, "Historical series");

    let data = state.upstream.request(&path, &QueryParams::new()).await?;
    Ok(Json(data))
}

/// GET /api/historical/range
pub async fn historical_range(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>> {
    let (Some(country), Some(indicator), Some(start), Some(end)) = (
        required(&params, "country"),
        required(&params, "indicator"),
        required(&params, "start"),
        required(&params, "end"),
    ) else {
        return Err(invalid("country, indicator, start, end required (YYYY-MM-DD)"));
    };

    let start = parse_date("start", start)?;
    let end = parse_date("end", end)?;

    let path = format!(
        "{}/{}/{}",
        historical_path(country, indicator),
        start.format(DATE_FORMAT),
        end.format(DATE_FORMAT)
    );
    debug!(%path, "Historical range");

    let data = state.upstream.request(&path, &QueryParams::new()).await?;
    Ok(Json(data))
}

/// GET /api/indicators
pub async fn indicators(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>> {
    let query: QueryParams = params.into_iter().collect();
    let data = state.upstream.request("/indicators", &query).await?;
    Ok(Json(data))
}

/// GET /api/calendar
pub async fn calendar(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>> {
    let query: QueryParams = params.into_iter().collect();
    let data = state.upstream.request("/calendar", &query).await?;
    Ok(Json(data))
}

/// GET /health
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        time: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        version: env!("CARGO_PKG_VERSION").into(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        cached_entries: state.upstream.cached_entries(),
        fresh_entries: state.upstream.fresh_entries(),
    })
}

/// Fallback for unknown routes.
pub async fn not_found() -> ApiError {
    ApiError::not_found("not found")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_treats_empty_as_missing() {
        let params = HashMap::from([
            ("country".to_string(), "japan".to_string()),
            ("indicator".to_string(), String::new()),
        ]);
        assert_eq!(required(&params, "country"), Some("japan"));
        assert_eq!(required(&params, "indicator"), None);
        assert_eq!(required(&params, "start"), None);
    }

    #[test]
    fn test_historical_path_encodes_segments() {
        assert_eq!(
            historical_path("united states", "gdp"),
            "/historical/country/united%20states/indicator/gdp"
        );
        assert_eq!(
            historical_path("a/b", "x"),
            "/historical/country/a%2Fb/indicator/x"
        );
    }

    #[test]
    fn test_parse_date() {
        assert!(parse_date("start", "2024-01-31").is_ok());
        assert!(parse_date("start", "2024-02-30").is_err());
        assert!(parse_date("end", "31/01/2024").is_err());
    }
}
