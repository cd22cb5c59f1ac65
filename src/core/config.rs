//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.qa-assist/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.
//!
//! The result of resolution is a [`ProviderConfig`]: a plain value the router
//! borrows for the duration of a call. Nothing in the inference layer can
//! mutate it.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::Provider;
use crate::inference::RetryPolicy;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct AssistConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub gemini: EndpointConfig,
    #[serde(default)]
    pub gemini_native: EndpointConfig,
    #[serde(default)]
    pub deepseek: EndpointConfig,
    #[serde(default)]
    pub openrouter: EndpointConfig,
    #[serde(default)]
    pub retry: RetryConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub provider: Option<Provider>,
    pub model: Option<String>,
    pub system_prompt: Option<String>,
    /// Used when a provider has no key of its own (DeepSeek only).
    pub api_key: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct EndpointConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RetryConfig {
    pub max_attempts: Option<u32>,
    pub initial_delay_ms: Option<u64>,
    pub request_timeout_secs: Option<u64>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_GEMINI_NATIVE_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com";
pub const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

// ============================================================================
// Resolved Config (concrete values)
// ============================================================================

/// Everything the router needs to reach a provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub provider: Provider,
    pub selected_model: Option<String>,
    pub system_prompt: String,
    pub api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub deepseek_api_key: Option<String>,
    pub openrouter_api_key: Option<String>,
    /// AI gateway in front of Gemini. Deployment specific, so there is no default.
    pub gemini_base_url: Option<String>,
    pub gemini_native_base_url: String,
    pub deepseek_base_url: String,
    pub openrouter_base_url: String,
    pub retry: RetryPolicy,
    pub request_timeout: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            selected_model: None,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            api_key: None,
            gemini_api_key: None,
            deepseek_api_key: None,
            openrouter_api_key: None,
            gemini_base_url: None,
            gemini_native_base_url: DEFAULT_GEMINI_NATIVE_BASE_URL.to_string(),
            deepseek_base_url: DEFAULT_DEEPSEEK_BASE_URL.to_string(),
            openrouter_base_url: DEFAULT_OPENROUTER_BASE_URL.to_string(),
            retry: RetryPolicy::default(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl ProviderConfig {
    /// The configured key for `provider`, ignoring blank values.
    /// DeepSeek falls back to the generic `api_key`.
    pub fn api_key_for(&self, provider: Provider) -> Option<&str> {
        let key = match provider {
            Provider::Gemini | Provider::GeminiNative => self.gemini_api_key.as_deref(),
            Provider::DeepSeek => non_blank(self.deepseek_api_key.as_deref())
                .or(self.api_key.as_deref()),
            Provider::OpenRouter => self.openrouter_api_key.as_deref(),
        };
        non_blank(key)
    }

    /// Key of the active provider.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key_for(self.provider)
    }

    /// `None` only for the Gemini gateway when no base URL was configured.
    pub fn base_url_for(&self, provider: Provider) -> Option<&str> {
        match provider {
            Provider::Gemini => non_blank(self.gemini_base_url.as_deref()),
            Provider::GeminiNative => Some(&self.gemini_native_base_url),
            Provider::DeepSeek => Some(&self.deepseek_base_url),
            Provider::OpenRouter => Some(&self.openrouter_base_url),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Values given on the command line. `None` means "not specified".
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub provider: Option<Provider>,
    pub model: Option<String>,
    pub system_prompt: Option<String>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.qa-assist/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".qa-assist").join("config.toml"))
}

/// Load config from `~/.qa-assist/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `AssistConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<AssistConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(AssistConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(AssistConfig::default());
    }

    load_config_from(&path)
}

/// Load config from an explicit path. The file must exist.
pub fn load_config_from(path: &Path) -> Result<AssistConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: AssistConfig = toml::from_str(&contents)?;
    info!("Loaded config from {}", path.display());
    Ok(config)
}

fn generate_default_config(path: &Path) {
    let default_content = r#"# qa-assist configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# provider = "gemini"                # "gemini", "gemini-native", "deepseek" or "openrouter"
# model = "gemini-1.5-flash-latest"
# system_prompt = "You are a helpful assistant."
# api_key = "..."                    # Fallback key for DeepSeek

# [gemini]
# api_key = "..."                    # Or set GEMINI_API_KEY (also used by gemini-native)
# base_url = "https://gateway.example.com/v1/<account>/<gateway>"
#                                    # Required for provider "gemini" (or set GEMINI_BASE_URL).
#                                    # Your AI gateway exposing /compat/chat/completions;
#                                    # use "gemini-native" to call Google directly instead.

# [gemini_native]
# base_url = "https://generativelanguage.googleapis.com/v1beta"

# [deepseek]
# api_key = "sk-..."                 # Or set DEEPSEEK_API_KEY
# base_url = "https://api.deepseek.com"

# [openrouter]
# api_key = "sk-or-..."              # Or set OPENROUTER_API_KEY
# base_url = "https://openrouter.ai/api/v1"

# [retry]
# max_attempts = 3
# initial_delay_ms = 1000            # Doubles after every failed attempt
# request_timeout_secs = 120
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &AssistConfig, cli: &CliOverrides) -> Result<ProviderConfig, ConfigError> {
    resolve_from(config, cli, |key| std::env::var(key).ok())
}

/// Same as [`resolve`] with an explicit environment lookup.
pub fn resolve_from(
    config: &AssistConfig,
    cli: &CliOverrides,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ProviderConfig, ConfigError> {
    // Provider: CLI → env → config → default
    let provider = match cli.provider {
        Some(p) => p,
        None => match env("QA_ASSIST_PROVIDER") {
            Some(name) => Provider::parse(&name).ok_or(ConfigError::InvalidValue {
                key: "QA_ASSIST_PROVIDER",
                value: name,
            })?,
            None => config.general.provider.unwrap_or_default(),
        },
    };

    let selected_model = cli
        .model
        .clone()
        .or_else(|| env("QA_ASSIST_MODEL"))
        .or_else(|| config.general.model.clone())
        .filter(|m| !m.trim().is_empty());

    let system_prompt = cli
        .system_prompt
        .clone()
        .or_else(|| config.general.system_prompt.clone())
        .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());

    // API keys: env → config
    let gemini_api_key = env("GEMINI_API_KEY").or_else(|| config.gemini.api_key.clone());
    let deepseek_api_key = env("DEEPSEEK_API_KEY").or_else(|| config.deepseek.api_key.clone());
    let openrouter_api_key =
        env("OPENROUTER_API_KEY").or_else(|| config.openrouter.api_key.clone());

    // Base URLs: env → config → default
    let base_url = |var: &str, section: &EndpointConfig, default: &str| {
        env(var)
            .or_else(|| section.base_url.clone())
            .unwrap_or_else(|| default.to_string())
            .trim_end_matches('/')
            .to_string()
    };

    let mut retry = RetryPolicy::default();
    if let Some(n) = config.retry.max_attempts {
        retry = retry.with_max_attempts(n);
    }
    if let Some(ms) = config.retry.initial_delay_ms {
        retry = retry.with_initial_delay(Duration::from_millis(ms));
    }

    let resolved = ProviderConfig {
        provider,
        selected_model,
        system_prompt,
        api_key: config.general.api_key.clone(),
        gemini_api_key,
        deepseek_api_key,
        openrouter_api_key,
        gemini_base_url: env("GEMINI_BASE_URL")
            .or_else(|| config.gemini.base_url.clone())
            .filter(|url| !url.trim().is_empty())
            .map(|url| url.trim_end_matches('/').to_string()),
        gemini_native_base_url: base_url(
            "GEMINI_NATIVE_BASE_URL",
            &config.gemini_native,
            DEFAULT_GEMINI_NATIVE_BASE_URL,
        ),
        deepseek_base_url: base_url("DEEPSEEK_BASE_URL", &config.deepseek, DEFAULT_DEEPSEEK_BASE_URL),
        openrouter_base_url: base_url(
            "OPENROUTER_BASE_URL",
            &config.openrouter,
            DEFAULT_OPENROUTER_BASE_URL,
        ),
        retry,
        request_timeout: Duration::from_secs(
            config
                .retry
                .request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        ),
    };

    debug!(
        "Resolved config: provider={:?}, model={:?}, retry={:?}",
        resolved.provider, resolved.selected_model, resolved.retry
    );
    Ok(resolved)
}
