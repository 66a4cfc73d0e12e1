//! HTTP fetching with retry on transient upstream failures.

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, instrument, warn};

use tegate_core::error::{ProxyError, Result};

use crate::retry::{classify, Classification, RetryPolicy};

/// Parses a response body as JSON, falling back to the raw text.
pub fn parse_body(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_owned()))
}

/// Issues GET requests and retries 409/429/5xx answers.
///
/// Network-level failures are not retried. There is no circuit breaker:
/// each call runs its own retry sequence.
#[derive(Clone, Debug)]
pub struct Fetcher {
    http_client: reqwest::Client,
    policy: RetryPolicy,
}

impl Fetcher {
    /// Creates a fetcher whose individual attempts time out after `timeout`.
    pub fn new(timeout: Duration, policy: RetryPolicy) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProxyError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self::with_client(http_client, policy))
    }

    /// Creates a fetcher around an existing HTTP client.
    pub fn with_client(http_client: reqwest::Client, policy: RetryPolicy) -> Self {
        Self {
            http_client,
            policy,
        }
    }

    /// Fetches `url`, retrying transient failures.
    ///
    /// Once attempts run out the last retryable answer is reported as
    /// `TerminalUpstream` with its status and body.
    #[instrument(skip_all)]
    pub async fn fetch(&self, url: &str) -> Result<Value> {
        let mut attempts = 0;

        loop {
            attempts += 1;

            match self.fetch_once(url).await {
                Ok(body) => {
                    if attempts > 1 {
                        debug!(attempts, "Upstream call succeeded after retries");
                    }
                    return Ok(body);
                }
                Err(err) if err.is_retryable() && self.policy.should_retry(attempts) => {
                    let retry = self.policy.attempt(attempts);
                    warn!(
                        status = ?err.status(),
                        attempt = attempts,
                        retry = retry.attempt_number,
                        delay_ms = retry.delay().as_millis() as u64,
                        "Transient upstream failure, backing off"
                    );
                    tokio::time::sleep(retry.delay()).await;
                }
                Err(err) => {
                    if err.is_retryable() {
                        warn!(status = ?err.status(), attempts, "Retries exhausted");
                    }
                    return Err(err.into_terminal());
                }
            }
        }
    }

    async fn fetch_once(&self, url: &str) -> Result<Value> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| ProxyError::Transport(e.without_url().to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ProxyError::Transport(e.without_url().to_string()))?;
        let body = parse_body(&text);

        match classify(status) {
            Classification::Success => Ok(body),
            Classification::Retryable => Err(ProxyError::RetryableUpstream { status, body }),
            Classification::Terminal => Err(ProxyError::TerminalUpstream { status, body }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher() -> Fetcher {
        Fetcher::new(Duration::from_secs(5), RetryPolicy::immediate()).unwrap()
    }

    #[test]
    fn test_parse_body() {
        assert_eq!(parse_body(r#"[{"Value": 1.5}]"#), json!([{"Value": 1.5}]));
        assert_eq!(parse_body("No Access"), json!("No Access"));
        assert_eq!(parse_body(""), json!(""));
    }

    #[tokio::test]
    async fn test_success_returns_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/indicators"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"Category": "GDP"}])))
            .expect(1)
            .mount(&server)
            .await;

        let body = fetcher()
            .fetch(&format!("{}/indicators", server.uri()))
            .await
            .unwrap();
        assert_eq!(body, json!([{"Category": "GDP"}]));
    }

    #[tokio::test]
    async fn test_success_with_text_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("plain text"))
            .mount(&server)
            .await;

        let body = fetcher().fetch(&server.uri()).await.unwrap();
        assert_eq!(body, json!("plain text"));
    }

    #[tokio::test]
    async fn test_429_exhausts_five_attempts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({"error": "rate"})))
            .up_to_n_times(4)
            .expect(4)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(429).set_body_json(json!({"error": "rate", "attempt": 5})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let err = fetcher().fetch(&server.uri()).await.unwrap_err();
        match err {
            ProxyError::TerminalUpstream { status, body } => {
                assert_eq!(status, 429);
                assert_eq!(body, json!({"error": "rate", "attempt": 5}));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_400_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad country"))
            .expect(1)
            .mount(&server)
            .await;

        let err = fetcher().fetch(&server.uri()).await.unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.body(), Some(&json!("bad country")));
    }

    #[tokio::test]
    async fn test_recovers_after_503s() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let body = fetcher().fetch(&server.uri()).await.unwrap();
        assert_eq!(body, json!({"ok": true}));
    }

    #[tokio::test]
    async fn test_409_is_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(409))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        assert_eq!(fetcher().fetch(&server.uri()).await.unwrap(), json!([]));
    }

    #[tokio::test]
    async fn test_attempt_limit_is_configurable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(2)
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(
            Duration::from_secs(5),
            RetryPolicy::immediate().with_max_attempts(2),
        )
        .unwrap();
        let err = fetcher.fetch(&server.uri()).await.unwrap_err();
        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn test_backs_off_between_attempts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&server)
            .await;

        let policy = RetryPolicy {
            max_attempts: 3,
            base: Duration::from_millis(50),
            cap: Duration::from_millis(80),
            jitter_max: Duration::ZERO,
        };
        let fetcher = Fetcher::new(Duration::from_secs(5), policy).unwrap();

        let start = std::time::Instant::now();
        let err = fetcher.fetch(&server.uri()).await.unwrap_err();
        let elapsed = start.elapsed();

        assert_eq!(err.status(), Some(503));
        // 50ms before the first retry, then 100ms capped to 80ms.
        assert!(elapsed >= Duration::from_millis(130), "elapsed {elapsed:?}");
    }

    #[tokio::test]
    async fn test_connection_failure_is_transport_error() {
        // Nothing listens on port 1.
        let err = fetcher().fetch("http://127.0.0.1:1/").await.unwrap_err();
        assert!(matches!(err, ProxyError::Transport(_)));
        assert_eq!(err.status(), None);
    }
}
