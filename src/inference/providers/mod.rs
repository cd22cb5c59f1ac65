//! # Provider Profiles
//!
//! Each provider is a row in a table: how to name the model, where to POST,
//! how to authenticate, how to build the body and how to read the reply.
//! The router looks the row up once per call and never branches on the
//! provider itself, so supporting another upstream is a matter of adding a
//! profile here.

pub mod chat_completions;
pub mod gemini;

use crate::Provider;
use crate::inference::{Completion, Prompt};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash-latest";
pub const DEFAULT_DEEPSEEK_MODEL: &str = "deepseek-chat";
pub const DEFAULT_OPENROUTER_MODEL: &str = "openai/gpt-4o";
/// Gateway routing prefix for Google AI Studio models.
pub const GEMINI_GATEWAY_PREFIX: &str = "google-ai-studio/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStyle {
    Bearer,
    QueryKey,
}

pub struct ProviderProfile {
    pub provider: Provider,
    /// Maps the configured model (if any) to the id this provider expects.
    pub resolve_model: fn(Option<&str>) -> String,
    /// `(base_url, model) -> url`
    pub endpoint: fn(&str, &str) -> String,
    pub auth: AuthStyle,
    pub build_body: fn(&Prompt<'_>, &str) -> Result<String, serde_json::Error>,
    pub parse_response: fn(&str) -> Result<Completion, serde_json::Error>,
}

static GEMINI: ProviderProfile = ProviderProfile {
    provider: Provider::Gemini,
    resolve_model: gateway_model,
    endpoint: gateway_endpoint,
    auth: AuthStyle::Bearer,
    build_body: chat_completions::build_body,
    parse_response: chat_completions::parse_response,
};

static GEMINI_NATIVE: ProviderProfile = ProviderProfile {
    provider: Provider::GeminiNative,
    resolve_model: native_model,
    endpoint: native_endpoint,
    auth: AuthStyle::QueryKey,
    build_body: gemini::build_body,
    parse_response: gemini::parse_response,
};

static DEEPSEEK: ProviderProfile = ProviderProfile {
    provider: Provider::DeepSeek,
    resolve_model: deepseek_model,
    endpoint: chat_completions_endpoint,
    auth: AuthStyle::Bearer,
    build_body: chat_completions::build_body_unstreamed,
    parse_response: chat_completions::parse_response,
};

static OPENROUTER: ProviderProfile = ProviderProfile {
    provider: Provider::OpenRouter,
    resolve_model: openrouter_model,
    endpoint: chat_completions_endpoint,
    auth: AuthStyle::Bearer,
    build_body: chat_completions::build_body,
    parse_response: chat_completions::parse_response,
};

pub fn profile(provider: Provider) -> &'static ProviderProfile {
    match provider {
        Provider::Gemini => &GEMINI,
        Provider::GeminiNative => &GEMINI_NATIVE,
        Provider::DeepSeek => &DEEPSEEK,
        Provider::OpenRouter => &OPENROUTER,
    }
}

// ============================================================================
// Model naming
// ============================================================================

/// Ids that already name a gateway route (`vendor/model`) pass through.
fn gateway_model(selected: Option<&str>) -> String {
    match selected {
        Some(model) if model.contains('/') => model.to_string(),
        Some(model) => format!("{GEMINI_GATEWAY_PREFIX}{model}"),
        None => format!("{GEMINI_GATEWAY_PREFIX}{DEFAULT_GEMINI_MODEL}"),
    }
}

fn native_model(selected: Option<&str>) -> String {
    gemini::bare_model(selected.unwrap_or(DEFAULT_GEMINI_MODEL)).to_string()
}

/// DeepSeek only honours its own model ids; anything else left over from
/// another provider gets the default chat model.
fn deepseek_model(selected: Option<&str>) -> String {
    selected
        .filter(|m| m.starts_with("deepseek-"))
        .unwrap_or(DEFAULT_DEEPSEEK_MODEL)
        .to_string()
}

fn openrouter_model(selected: Option<&str>) -> String {
    selected.unwrap_or(DEFAULT_OPENROUTER_MODEL).to_string()
}

// ============================================================================
// Endpoints
// ============================================================================

fn chat_completions_endpoint(base_url: &str, _model: &str) -> String {
    format!("{base_url}/chat/completions")
}

fn gateway_endpoint(base_url: &str, _model: &str) -> String {
    format!("{base_url}/compat/chat/completions")
}

fn native_endpoint(base_url: &str, model: &str) -> String {
    format!("{base_url}/models/{model}:generateContent")
}
