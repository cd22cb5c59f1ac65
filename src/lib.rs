//! qa-assist library exports

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub mod core;
pub mod inference;

#[cfg(test)]
pub mod test_support;

/// Upstream LLM service a completion is routed to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
pub enum Provider {
    /// Gemini through the OpenAI-compatible AI gateway.
    #[default]
    #[value(name = "gemini")]
    #[serde(rename = "gemini")]
    Gemini,
    /// Gemini's own `generateContent` endpoint.
    #[value(name = "gemini-native")]
    #[serde(rename = "gemini-native")]
    GeminiNative,
    #[value(name = "deepseek")]
    #[serde(rename = "deepseek")]
    DeepSeek,
    #[value(name = "openrouter")]
    #[serde(rename = "openrouter")]
    OpenRouter,
}

impl Provider {
    /// Human-readable name used in user-facing messages.
    pub fn label(self) -> &'static str {
        match self {
            Provider::Gemini | Provider::GeminiNative => "Gemini",
            Provider::DeepSeek => "DeepSeek",
            Provider::OpenRouter => "OpenRouter",
        }
    }

    /// Parses a provider name the way the CLI does (case-insensitive).
    pub fn parse(name: &str) -> Option<Provider> {
        <Provider as ValueEnum>::from_str(name.trim(), true).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_parse_accepts_cli_names() {
        assert_eq!(Provider::parse("gemini"), Some(Provider::Gemini));
        assert_eq!(Provider::parse("Gemini-Native"), Some(Provider::GeminiNative));
        assert_eq!(Provider::parse(" deepseek "), Some(Provider::DeepSeek));
        assert_eq!(Provider::parse("openrouter"), Some(Provider::OpenRouter));
        assert_eq!(Provider::parse("anthropic"), None);
    }

    #[test]
    fn test_provider_serde_names_match_cli_names() {
        assert_eq!(serde_json::to_string(&Provider::DeepSeek).unwrap(), "\"deepseek\"");
        let p: Provider = serde_json::from_str("\"gemini-native\"").unwrap();
        assert_eq!(p, Provider::GeminiNative);
    }

    #[test]
    fn test_default_provider_is_gemini() {
        assert_eq!(Provider::default(), Provider::Gemini);
        assert_eq!(Provider::GeminiNative.label(), "Gemini");
    }
}
