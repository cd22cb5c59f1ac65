use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::Provider;

/// A prompt to send, plus optional per-call overrides of the configured
/// provider and model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub prompt: String,
    /// Falls back to the configured system prompt when `None`.
    pub system_prompt: Option<String>,
    pub provider: Option<Provider>,
    pub model: Option<String>,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system_prompt: None,
            provider: None,
            model: None,
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn with_provider(mut self, provider: Provider) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// Prompt text as handed to a provider's body builder.
#[derive(Debug, Clone, Copy)]
pub struct Prompt<'a> {
    pub system: &'a str,
    pub user: &'a str,
}

/// Token counts for one call, identical in shape for every provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    pub prompt_tokens: u64,
    pub response_tokens: u64,
    pub total_token_count: u64,
}

impl Usage {
    /// Uses the provider's total when it sent one, otherwise the sum.
    pub fn new(prompt_tokens: u64, response_tokens: u64, total: Option<u64>) -> Self {
        Self {
            prompt_tokens,
            response_tokens,
            total_token_count: total.unwrap_or(prompt_tokens.saturating_add(response_tokens)),
        }
    }
}

/// Normalized reply body: what every provider parser produces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion {
    pub content: String,
    pub usage: Usage,
}

/// What a caller gets back from the router.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionResult {
    pub content: String,
    pub usage: Usage,
    /// Wall-clock time of the whole call, retries and backoff included.
    #[serde(serialize_with = "serialize_millis")]
    pub duration: Duration,
    pub provider: Provider,
    pub model: String,
}

impl CompletionResult {
    pub fn duration_ms(&self) -> u64 {
        u64::try_from(self.duration.as_millis()).unwrap_or(u64::MAX)
    }
}

fn serialize_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
}
