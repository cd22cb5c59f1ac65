//! # Provider Router
//!
//! Entry point for callers: takes a prompt and the resolved configuration,
//! picks the provider profile, delegates the HTTP exchange to the
//! [`Transport`] and returns a provider-agnostic [`CompletionResult`].

use std::sync::Arc;
use std::time::Instant;

use log::{debug, info, warn};
use reqwest::Client;

use super::providers::{self, AuthStyle};
use super::transport::{Auth, HttpRequest, Transport};
use super::{CompletionError, CompletionRequest, CompletionResult, Prompt};
use crate::core::config::ProviderConfig;
use crate::core::notify::Notifier;

pub struct Router {
    transport: Transport,
}

impl Router {
    /// Creates a router with its own HTTP client. Retry policy and timeout
    /// are read from the config passed to each call.
    pub fn new(notifier: Arc<dyn Notifier>) -> Result<Self, CompletionError> {
        let client = Client::builder()
            .build()
            .map_err(|e| CompletionError::Config(format!("could not create HTTP client: {e}")))?;
        Ok(Self::with_transport(Transport::new(client, notifier)))
    }

    pub fn with_transport(transport: Transport) -> Self {
        Self { transport }
    }

    /// Sends `prompt` to the configured provider. `system_prompt` falls back
    /// to the configured default.
    pub async fn fetch_from_api(
        &self,
        config: &ProviderConfig,
        prompt: &str,
        system_prompt: Option<&str>,
    ) -> Result<CompletionResult, CompletionError> {
        let mut request = CompletionRequest::new(prompt);
        request.system_prompt = system_prompt.map(str::to_string);
        self.complete(config, &request).await
    }

    /// Like [`fetch_from_api`](Self::fetch_from_api), honouring the request's
    /// provider and model overrides.
    pub async fn complete(
        &self,
        config: &ProviderConfig,
        request: &CompletionRequest,
    ) -> Result<CompletionResult, CompletionError> {
        let start = Instant::now();

        if request.prompt.trim().is_empty() {
            return Err(CompletionError::InvalidRequest(
                "prompt must not be empty".to_string(),
            ));
        }

        let provider = request.provider.unwrap_or(config.provider);
        let profile = providers::profile(provider);

        let api_key = config.api_key_for(provider).ok_or_else(|| {
            CompletionError::Config(format!("{} API key not configured", provider.label()))
        })?;
        let base_url = config.base_url_for(provider).ok_or_else(|| {
            CompletionError::Config(
                "Gemini gateway base URL not configured: set [gemini] base_url or \
                 GEMINI_BASE_URL, or use the gemini-native provider"
                    .to_string(),
            )
        })?;

        let model = (profile.resolve_model)(
            request
                .model
                .as_deref()
                .or(config.selected_model.as_deref()),
        );
        let prompt = Prompt {
            system: request
                .system_prompt
                .as_deref()
                .unwrap_or(&config.system_prompt),
            user: &request.prompt,
        };

        let body = (profile.build_body)(&prompt, &model).map_err(|e| {
            CompletionError::InvalidRequest(format!("could not serialize request body: {e}"))
        })?;
        let auth = match profile.auth {
            AuthStyle::Bearer => Auth::Bearer(api_key.to_string()),
            AuthStyle::QueryKey => Auth::QueryKey(api_key.to_string()),
        };
        let http_request = HttpRequest {
            url: (profile.endpoint)(base_url, &model),
            auth,
            body,
            timeout: Some(config.request_timeout),
        };

        info!(
            "Completion request: provider={:?}, model={}, prompt_len={}",
            provider,
            model,
            request.prompt.len()
        );

        let response = self
            .transport
            .fetch_with_retry(&http_request, config.retry)
            .await?;
        let text = response
            .text()
            .await
            .map_err(|e| CompletionError::Parse(format!("could not read response body: {e}")))?;
        debug!("Raw {:?} response: {} bytes", provider, text.len());

        let completion = (profile.parse_response)(&text).map_err(|e| {
            warn!("Malformed {:?} response: {}", provider, e);
            CompletionError::Parse(e.to_string())
        })?;

        let duration = start.elapsed();
        info!(
            "Completion done: provider={:?}, tokens={}, duration={:?}",
            provider, completion.usage.total_token_count, duration
        );

        Ok(CompletionResult {
            content: completion.content,
            usage: completion.usage,
            duration,
            provider,
            model,
        })
    }
}
