//! Error types for tegate.
//!
//! Every failure the fetch pipeline can produce is one variant of
//! `ProxyError`, so callers can match on the kind instead of probing for
//! optional status/body fields.

use serde_json::Value;
use thiserror::Error;

/// Result type alias using `ProxyError`.
pub type Result<T> = std::result::Result<T, ProxyError>;

/// Main error type for all tegate operations.
#[derive(Debug, Error)]
pub enum ProxyError {
    // ═══════════════════════════════════════════════════════════════════════════
    // REQUEST ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Required request parameters are missing or malformed.
    ///
    /// Raised by route handlers before the pipeline is invoked.
    #[error("{0}")]
    Validation(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // UPSTREAM ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Upstream answered 409, 429 or 5xx. Retried inside the fetcher and
    /// only seen by callers through [`ProxyError::into_terminal`].
    #[error("Upstream {status} (retryable)")]
    RetryableUpstream {
        /// HTTP status returned by upstream
        status: u16,
        /// Parsed response body (JSON, or the raw text as a string)
        body: Value,
    },

    /// Upstream answered with a non-retryable status, or retries ran out.
    #[error("Upstream {status}")]
    TerminalUpstream {
        /// HTTP status returned by upstream
        status: u16,
        /// Parsed response body (JSON, or the raw text as a string)
        body: Value,
    },

    /// No response was obtained (DNS, connect, TLS, timeout, broken body).
    #[error("Upstream request failed: {0}")]
    Transport(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // INTERNAL ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Configuration is unusable (e.g. the base URL does not parse).
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ProxyError {
    /// Upstream HTTP status, when the error came from an HTTP response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ProxyError::RetryableUpstream { status, .. }
            | ProxyError::TerminalUpstream { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Upstream response body, when one was received.
    pub fn body(&self) -> Option<&Value> {
        match self {
            ProxyError::RetryableUpstream { body, .. }
            | ProxyError::TerminalUpstream { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Returns true if the fetcher should try again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProxyError::RetryableUpstream { .. })
    }

    /// Converts a retryable failure into the terminal one reported once
    /// attempts are exhausted. Other variants pass through unchanged.
    pub fn into_terminal(self) -> Self {
        match self {
            ProxyError::RetryableUpstream { status, body } => {
                ProxyError::TerminalUpstream { status, body }
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_display() {
        let err = ProxyError::TerminalUpstream {
            status: 403,
            body: json!({"message": "forbidden"}),
        };
        assert_eq!(err.to_string(), "Upstream 403");

        let err = ProxyError::Transport("connection refused".into());
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_status_and_body() {
        let err = ProxyError::TerminalUpstream {
            status: 400,
            body: json!("bad request"),
        };
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.body(), Some(&json!("bad request")));

        let err = ProxyError::Transport("dns".into());
        assert_eq!(err.status(), None);
        assert!(err.body().is_none());
    }

    #[test]
    fn test_into_terminal_keeps_status_and_body() {
        let err = ProxyError::RetryableUpstream {
            status: 429,
            body: json!({"error": "slow down"}),
        };
        assert!(err.is_retryable());

        let terminal = err.into_terminal();
        assert!(!terminal.is_retryable());
        assert!(matches!(
            terminal,
            ProxyError::TerminalUpstream { status: 429, ref body } if body["error"] == "slow down"
        ));
    }

    #[test]
    fn test_into_terminal_passes_other_variants() {
        let err = ProxyError::Validation("country required".into()).into_terminal();
        assert!(matches!(err, ProxyError::Validation(_)));
    }
}
