//! Helpers shared by the integration tests.
#![allow(dead_code)]

use std::net::TcpListener;
use std::sync::Mutex;
use std::time::Duration;

use qa_assist::Provider;
use qa_assist::core::config::ProviderConfig;
use qa_assist::core::notify::Notifier;
use qa_assist::inference::RetryPolicy;
use wiremock::MockServer;

/// Collects notifications instead of showing them.
#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.messages.lock().unwrap().len()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

pub const FAST_DELAY: Duration = Duration::from_millis(5);

/// Millisecond backoff so retry tests stay fast.
pub fn fast_policy() -> RetryPolicy {
    RetryPolicy::new(3, FAST_DELAY)
}

/// Every provider points at `base_url` and has a key.
pub fn config_for(provider: Provider, base_url: &str) -> ProviderConfig {
    ProviderConfig {
        provider,
        gemini_api_key: Some("test-gemini-key".to_string()),
        deepseek_api_key: Some("test-deepseek-key".to_string()),
        openrouter_api_key: Some("test-openrouter-key".to_string()),
        gemini_base_url: Some(base_url.to_string()),
        gemini_native_base_url: base_url.to_string(),
        deepseek_base_url: base_url.to_string(),
        openrouter_base_url: base_url.to_string(),
        retry: fast_policy(),
        ..Default::default()
    }
}

pub async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.unwrap_or_default().len()
}

/// A local port nothing listens on.
pub fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}
