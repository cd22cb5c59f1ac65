//! OpenAI-style `/chat/completions` wire format, shared by DeepSeek,
//! OpenRouter and the Gemini gateway.

use serde::{Deserialize, Serialize};

use crate::inference::{Completion, Prompt, Usage};

// ============================================================================
// Request
// ============================================================================

#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
enum Role {
    System,
    User,
}

#[derive(Serialize, Debug)]
struct Message<'a> {
    role: Role,
    content: &'a str,
}

#[derive(Serialize, Debug)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

fn messages<'a>(prompt: &Prompt<'a>) -> Vec<Message<'a>> {
    vec![
        Message {
            role: Role::System,
            content: prompt.system,
        },
        Message {
            role: Role::User,
            content: prompt.user,
        },
    ]
}

/// `{model, messages}`
pub fn build_body(prompt: &Prompt<'_>, model: &str) -> Result<String, serde_json::Error> {
    serde_json::to_string(&ChatRequest {
        model,
        messages: messages(prompt),
        stream: None,
    })
}

/// `{model, messages, stream: false}`. DeepSeek streams unless told not to.
pub fn build_body_unstreamed(prompt: &Prompt<'_>, model: &str) -> Result<String, serde_json::Error> {
    serde_json::to_string(&ChatRequest {
        model,
        messages: messages(prompt),
        stream: Some(false),
    })
}

// ============================================================================
// Response
// ============================================================================

#[derive(Deserialize, Debug, Default)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize, Debug)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize, Debug)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
    total_tokens: Option<u64>,
}

/// Reads `choices[0].message.content` and `usage`. Missing fields become
/// empty content and zero counts.
pub fn parse_response(body: &str) -> Result<Completion, serde_json::Error> {
    let response: ChatResponse = serde_json::from_str(body)?;

    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .unwrap_or_default();

    let usage = response
        .usage
        .map(|u| Usage::new(u.prompt_tokens, u.completion_tokens, u.total_tokens))
        .unwrap_or_default();

    Ok(Completion { content, usage })
}
