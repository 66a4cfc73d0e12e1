//! API error handling.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use tegate_core::error::ProxyError;

/// API error: a status and the JSON body to send with it.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: Value,
}

impl ApiError {
    /// Creates an error whose body is `{"error": message}`.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "error": message.into() }),
        }
    }

    /// Bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Internal server error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Status that will be sent.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Body that will be sent.
    pub fn body(&self) -> &Value {
        &self.body
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

fn is_blank(body: &Value) -> bool {
    match body {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

impl From<ProxyError> for ApiError {
    fn from(err: ProxyError) -> Self {
        match err {
            ProxyError::Validation(message) => ApiError::bad_request(message),
            ProxyError::TerminalUpstream { status, ref body }
            | ProxyError::RetryableUpstream { status, ref body } => {
                let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
                if is_blank(body) {
                    ApiError::new(status, err.to_string())
                } else {
                    ApiError {
                        status,
                        body: body.clone(),
                    }
                }
            }
            ProxyError::Transport(_) => {
                tracing::warn!(error = %err, "Upstream unreachable");
                ApiError::internal(err.to_string())
            }
            ProxyError::Config(_) => {
                tracing::error!(error = %err, "Internal error");
                ApiError::internal(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_status_and_body_pass_through() {
        let err = ApiError::from(ProxyError::TerminalUpstream {
            status: 403,
            body: json!({"Message": "No Access to this country"}),
        });
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        assert_eq!(err.body(), &json!({"Message": "No Access to this country"}));
    }

    #[test]
    fn test_blank_upstream_body_uses_message() {
        let err = ApiError::from(ProxyError::TerminalUpstream {
            status: 429,
            body: json!(""),
        });
        assert_eq!(err.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(err.body(), &json!({"error": "Upstream 429"}));
    }

    #[test]
    fn test_transport_maps_to_500() {
        let err = ApiError::from(ProxyError::Transport("connection refused".into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.body()["error"].as_str().unwrap().contains("connection refused"));
    }

    #[test]
    fn test_validation_maps_to_400() {
        let err = ApiError::from(ProxyError::Validation("country & indicator required".into()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.body(), &json!({"error": "country & indicator required"}));
    }
}
