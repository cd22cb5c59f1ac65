//! # Transport
//!
//! A resilient HTTP POST. Knows nothing about providers or prompts: it sends
//! a prepared body, classifies the outcome and decides whether to retry.
//!
//! ```text
//! attempt ──▶ 2xx ─────────────────────────▶ Ok(response)
//!    │
//!    ├──▶ 4xx (not 429) ─────────────────────▶ Err(Client)        no retry
//!    │
//!    └──▶ 429 / 5xx / connection failure ──▶ sleep(initial * 2^i) ──▶ attempt
//!                                              (last attempt) ──▶ Err(last)
//! ```
//!
//! Attempts are strictly sequential. Each attempt produces a typed outcome;
//! the only error that leaves this module is the one from the final attempt,
//! and it is reported to the [`Notifier`] first.

use std::error::Error as _;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response, StatusCode};

use super::error::{TransportError, describe_status};
use crate::core::notify::Notifier;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_INITIAL_DELAY_MS: u64 = 1000;

/// How many attempts to make and how long to wait between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_ATTEMPTS,
            Duration::from_millis(DEFAULT_INITIAL_DELAY_MS),
        )
    }
}

impl RetryPolicy {
    /// `max_attempts` is clamped to at least one.
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay,
        }
    }

    pub fn with_max_attempts(self, max_attempts: u32) -> Self {
        Self::new(max_attempts, self.initial_delay)
    }

    pub fn with_initial_delay(self, initial_delay: Duration) -> Self {
        Self::new(self.max_attempts, initial_delay)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    /// Sleep after the failed attempt with 0-based index `attempt_index`.
    pub fn delay_for(&self, attempt_index: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt_index).unwrap_or(u32::MAX);
        self.initial_delay.saturating_mul(factor)
    }
}

/// How the API key travels.
#[derive(Clone)]
pub enum Auth {
    /// `Authorization: Bearer <key>`
    Bearer(String),
    /// `?key=<key>` on the URL.
    QueryKey(String),
}

impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Auth::Bearer(_) => f.write_str("Bearer(..)"),
            Auth::QueryKey(_) => f.write_str("QueryKey(..)"),
        }
    }
}

/// A fully prepared POST. `body` is serialized JSON.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub auth: Auth,
    pub body: String,
    /// Applies to each attempt separately. `None` leaves the client's own.
    pub timeout: Option<Duration>,
}

/// Outcome of a single failed attempt.
enum AttemptFailure {
    Terminal(TransportError),
    Retriable(TransportError),
}

pub struct Transport {
    client: Client,
    notifier: Arc<dyn Notifier>,
}

impl Transport {
    pub fn new(client: Client, notifier: Arc<dyn Notifier>) -> Self {
        Self { client, notifier }
    }

    /// Sends `request`, retrying 429/5xx and connection failures with
    /// exponential backoff per `policy`. Returns the first 2xx response.
    pub async fn fetch_with_retry(
        &self,
        request: &HttpRequest,
        policy: RetryPolicy,
    ) -> Result<Response, TransportError> {
        let attempts = policy.max_attempts();
        let mut attempt = 0;

        let last_error = loop {
            debug!("POST {} (attempt {}/{})", request.url, attempt + 1, attempts);
            match self.attempt(request).await {
                Ok(response) => return Ok(response),
                Err(AttemptFailure::Terminal(err)) => {
                    warn!("Request to {} failed, not retrying: {}", request.url, err);
                    return Err(self.raise(err));
                }
                Err(AttemptFailure::Retriable(err)) => {
                    warn!(
                        "Attempt {}/{} to {} failed: {}",
                        attempt + 1,
                        attempts,
                        request.url,
                        err
                    );
                    if attempt + 1 >= attempts {
                        break err;
                    }
                    let delay = policy.delay_for(attempt);
                    debug!("Backing off for {:?}", delay);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        };

        Err(self.raise(exhausted(last_error, &request.url)))
    }

    async fn attempt(&self, request: &HttpRequest) -> Result<Response, AttemptFailure> {
        let builder = self
            .client
            .post(&request.url)
            .header(CONTENT_TYPE, "application/json")
            .body(request.body.clone());
        let builder = match request.timeout {
            Some(timeout) => builder.timeout(timeout),
            None => builder,
        };
        let builder = match &request.auth {
            Auth::Bearer(key) => builder.bearer_auth(key),
            Auth::QueryKey(key) => builder.query(&[("key", key)]),
        };

        let response = builder.send().await.map_err(classify_send_error)?;
        let status = response.status();
        debug!("Response status: {}", status);

        if status.is_success() {
            return Ok(response);
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!("Could not read {} error body from {}: {}", status, request.url, e);
                String::new()
            }
        };
        let code = status.as_u16();
        let message = describe_status(code, &body);

        if is_retriable_status(status) {
            Err(AttemptFailure::Retriable(TransportError::Server {
                status: code,
                message,
            }))
        } else {
            Err(AttemptFailure::Terminal(TransportError::Client {
                status: code,
                message,
            }))
        }
    }

    fn raise(&self, err: TransportError) -> TransportError {
        self.notifier.notify(&err.to_string());
        err
    }
}

/// 429 and 5xx are worth another try; every other non-2xx status is final.
pub fn is_retriable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn classify_send_error(err: reqwest::Error) -> AttemptFailure {
    if err.is_builder() {
        return AttemptFailure::Terminal(TransportError::Build(err.to_string()));
    }
    AttemptFailure::Retriable(TransportError::Network {
        detail: root_cause(&err),
        timed_out: err.is_timeout(),
    })
}

/// Innermost error message; reqwest's top-level message just repeats the URL.
fn root_cause(err: &reqwest::Error) -> String {
    let mut cause: &dyn std::error::Error = err;
    while let Some(source) = cause.source() {
        cause = source;
    }
    cause.to_string()
}

/// Rewrites a network failure that survived every attempt into a diagnostic.
fn exhausted(err: TransportError, url: &str) -> TransportError {
    match err {
        TransportError::Network { detail, timed_out } => {
            let target = origin(url);
            if timed_out {
                TransportError::TimedOut { target }
            } else {
                TransportError::Unreachable { target, detail }
            }
        }
        other => other,
    }
}

fn origin(url: &str) -> String {
    reqwest::Url::parse(url)
        .map(|u| u.origin().ascii_serialization())
        .unwrap_or_else(|_| url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_matches_documented_schedule() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.delay_for(0), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(1), Duration::from_millis(2000));
        assert_eq!(policy.delay_for(2), Duration::from_millis(4000));
    }

    #[test]
    fn test_policy_clamps_attempts_to_one() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts(), 1);
        assert_eq!(RetryPolicy::default().with_max_attempts(0).max_attempts(), 1);
    }

    #[test]
    fn test_delay_saturates_instead_of_overflowing() {
        let policy = RetryPolicy::new(100, Duration::from_secs(1));
        assert_eq!(policy.delay_for(64), Duration::from_secs(1).saturating_mul(u32::MAX));
    }

    #[test]
    fn test_retriable_statuses() {
        for code in [429u16, 500, 502, 503, 504] {
            assert!(is_retriable_status(StatusCode::from_u16(code).unwrap()), "{code}");
        }
        for code in [400u16, 401, 403, 404, 422] {
            assert!(!is_retriable_status(StatusCode::from_u16(code).unwrap()), "{code}");
        }
    }

    #[test]
    fn test_exhausted_network_error_becomes_diagnostic() {
        let err = exhausted(
            TransportError::Network {
                detail: "Connection refused (os error 111)".to_string(),
                timed_out: false,
            },
            "http://127.0.0.1:9/chat/completions",
        );
        let msg = err.to_string();
        assert!(matches!(err, TransportError::Unreachable { .. }));
        assert!(msg.contains("http://127.0.0.1:9"));
        assert!(msg.contains("proxy"));
        assert!(msg.contains("Connection refused"));
    }

    #[test]
    fn test_exhausted_timeout_becomes_timed_out() {
        let err = exhausted(
            TransportError::Network {
                detail: "operation timed out".to_string(),
                timed_out: true,
            },
            "https://api.deepseek.com/chat/completions",
        );
        assert!(matches!(err, TransportError::TimedOut { ref target } if target == "https://api.deepseek.com"));
    }

    #[test]
    fn test_exhausted_server_error_is_unchanged() {
        let err = exhausted(
            TransportError::Server {
                status: 503,
                message: "overloaded".to_string(),
            },
            "https://api.deepseek.com/chat/completions",
        );
        assert_eq!(err.to_string(), "overloaded");
        assert_eq!(err.status(), Some(503));
    }

    #[test]
    fn test_auth_debug_hides_key() {
        let rendered = format!("{:?}", Auth::Bearer("sk-secret".to_string()));
        assert!(!rendered.contains("sk-secret"));
    }
}
