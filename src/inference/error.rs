//! Error taxonomy for the inference layer, plus the decoder for the error
//! bodies providers send back with non-2xx responses.

use serde::Deserialize;
use thiserror::Error;

/// Failure raised by [`Transport::fetch_with_retry`](super::Transport::fetch_with_retry).
#[derive(Debug, Error)]
pub enum TransportError {
    /// 4xx other than 429. Never retried.
    #[error("{message}")]
    Client { status: u16, message: String },
    /// 5xx or 429 that outlived every attempt.
    #[error("{message}")]
    Server { status: u16, message: String },
    /// Connection-level failure. Only seen inside the retry loop; on
    /// exhaustion it becomes `Unreachable` or `TimedOut`.
    #[error("network error: {detail}")]
    Network { detail: String, timed_out: bool },
    #[error(
        "could not reach {target} ({detail}). Check your network connection, proxy or AI gateway settings and the configured base URL"
    )]
    Unreachable { target: String, detail: String },
    #[error(
        "request to {target} timed out. The provider may be overloaded, or a proxy is holding the connection"
    )]
    TimedOut { target: String },
    /// The request could not be constructed (bad URL, bad header).
    #[error("could not build request: {0}")]
    Build(String),
}

impl TransportError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            TransportError::Server { .. } | TransportError::Network { .. }
        )
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Client { status, .. } | TransportError::Server { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum CompletionError {
    /// Missing API key or similar. Detected before any request is made.
    #[error("{0}")]
    Config(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// A 2xx response whose body isn't the JSON we expect.
    #[error("could not parse provider response: {0}")]
    Parse(String),
}

// ============================================================================
// Provider error bodies
// ============================================================================

/// Shapes providers use for error payloads:
/// `{"error":{"message":..}}`, `{"error":".."}`, `{"message":..}`,
/// or an array wrapping any of them.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum ErrorBody {
    Many(Vec<ErrorBody>),
    Nested { error: ErrorDetail },
    Flat { message: String },
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum ErrorDetail {
    Object { message: String },
    Text(String),
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        match self {
            ErrorBody::Many(items) => items.into_iter().find_map(ErrorBody::into_message),
            ErrorBody::Nested {
                error: ErrorDetail::Object { message } | ErrorDetail::Text(message),
            } => Some(message),
            ErrorBody::Flat { message } => Some(message),
        }
    }
}

/// Extracts the human-readable message from a provider error body.
/// Returns `None` for anything unrecognized (HTML error pages, empty bodies).
pub fn parse_provider_error(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(ErrorBody::into_message)
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
}

/// Builds the message shown for a failed HTTP status.
pub(crate) fn describe_status(status: u16, body: &str) -> String {
    let detail = parse_provider_error(body);
    match (status, detail) {
        (404, Some(detail)) => format!(
            "API Error: 404 (model or endpoint not found): {detail}. Check the selected model and the provider base URL"
        ),
        (404, None) => "API Error: 404 (model or endpoint not found). Check the selected model and the provider base URL".to_string(),
        (_, Some(detail)) => detail,
        (status, None) => format!("API Error: {status}"),
    }
}
