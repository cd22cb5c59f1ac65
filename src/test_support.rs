//! Test utilities for the unit tests in this crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`). The
//! integration tests under `tests/` have their own copy in `tests/common`.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::Provider;
use crate::core::config::ProviderConfig;
use crate::core::notify::Notifier;
use crate::inference::{RetryPolicy, Router, Transport};

/// Collects notifications instead of showing them.
#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().map(|m| m.clone()).unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(message.to_string());
        }
    }
}

/// Config pointing every provider at `base_url`, with a key for each and
/// millisecond backoff.
pub fn test_config(provider: Provider, base_url: &str) -> ProviderConfig {
    ProviderConfig {
        provider,
        gemini_api_key: Some("test-gemini-key".to_string()),
        deepseek_api_key: Some("test-deepseek-key".to_string()),
        openrouter_api_key: Some("test-openrouter-key".to_string()),
        gemini_base_url: Some(base_url.to_string()),
        gemini_native_base_url: base_url.to_string(),
        deepseek_base_url: base_url.to_string(),
        openrouter_base_url: base_url.to_string(),
        retry: RetryPolicy::new(3, Duration::from_millis(5)),
        ..Default::default()
    }
}

pub fn test_router(notifier: Arc<RecordingNotifier>) -> Router {
    Router::with_transport(Transport::new(reqwest::Client::new(), notifier))
}
