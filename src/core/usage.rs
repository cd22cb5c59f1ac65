//! # Usage Accounting
//!
//! A flat, serializable record of one completion call: which provider and
//! model answered, how many tokens it cost and how long it took. Callers
//! persist these however they like; nothing here touches storage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Provider;
use crate::inference::CompletionResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageRecord {
    pub timestamp: DateTime<Utc>,
    pub provider: Provider,
    pub model: String,
    /// Caller-chosen tag for the kind of work (e.g. "chat", "locator").
    #[serde(rename = "type")]
    pub kind: String,
    pub prompt_tokens: u64,
    pub response_tokens: u64,
    pub total_tokens: u64,
    pub duration_ms: u64,
}

impl UsageRecord {
    pub fn from_result(result: &CompletionResult, kind: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            provider: result.provider,
            model: result.model.clone(),
            kind: kind.into(),
            prompt_tokens: result.usage.prompt_tokens,
            response_tokens: result.usage.response_tokens,
            total_tokens: result.usage.total_token_count,
            duration_ms: result.duration_ms(),
        }
    }
}
