//! Gemini's native `models/{model}:generateContent` wire format.

use serde::{Deserialize, Serialize};

use crate::inference::{Completion, Prompt, Usage};

const TEMPERATURE: f32 = 0.2;

#[derive(Serialize, Debug)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize, Debug)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    system_instruction: Content<'a>,
    generation_config: GenerationConfig,
}

/// `{contents:[{parts:[{text}]}], systemInstruction, generationConfig}`.
/// The model is part of the URL, not the body.
pub fn build_body(prompt: &Prompt<'_>, _model: &str) -> Result<String, serde_json::Error> {
    serde_json::to_string(&GenerateRequest {
        contents: vec![Content {
            parts: vec![Part { text: prompt.user }],
        }],
        system_instruction: Content {
            parts: vec![Part {
                text: prompt.system,
            }],
        },
        generation_config: GenerationConfig {
            temperature: TEMPERATURE,
        },
    })
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize, Debug)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
    total_token_count: Option<u64>,
}

/// Reads `candidates[0].content.parts[0].text` and `usageMetadata`.
pub fn parse_response(body: &str) -> Result<Completion, serde_json::Error> {
    let response: GenerateResponse = serde_json::from_str(body)?;

    let content = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text)
        .unwrap_or_default();

    let usage = response
        .usage_metadata
        .map(|u| {
            Usage::new(
                u.prompt_token_count,
                u.candidates_token_count,
                u.total_token_count,
            )
        })
        .unwrap_or_default();

    Ok(Completion { content, usage })
}

/// `models/{model}` URLs take the bare id.
pub fn bare_model(model: &str) -> &str {
    model.rsplit('/').next().unwrap_or(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_shape() {
        let prompt = Prompt {
            system: "Be brief.",
            user: "Generate locators",
        };
        let body: serde_json::Value =
            serde_json::from_str(&build_body(&prompt, "gemini-1.5-flash-latest").unwrap()).unwrap();
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Generate locators");
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "Be brief.");
        assert!(body["generationConfig"]["temperature"].is_number());
        assert!(body.get("model").is_none());
    }

    #[test]
    fn test_parse_candidate_text_and_usage_metadata() {
        let body = r#"{
            "candidates":[{"content":{"parts":[{"text":"first"},{"text":"second"}],"role":"model"}}],
            "usageMetadata":{"promptTokenCount":4,"candidatesTokenCount":6,"totalTokenCount":11}
        }"#;
        let completion = parse_response(body).unwrap();
        assert_eq!(completion.content, "first");
        assert_eq!(completion.usage.prompt_tokens, 4);
        assert_eq!(completion.usage.response_tokens, 6);
        // Gemini counts thinking tokens in the total, so trust the supplied value
        assert_eq!(completion.usage.total_token_count, 11);
    }

    #[test]
    fn test_parse_without_candidates() {
        let body = r#"{"usageMetadata":{"promptTokenCount":4,"candidatesTokenCount":0}}"#;
        let completion = parse_response(body).unwrap();
        assert_eq!(completion.content, "");
        assert_eq!(completion.usage.total_token_count, 4);
    }

    #[test]
    fn test_bare_model_strips_prefix() {
        assert_eq!(bare_model("google-ai-studio/gemini-1.5-pro"), "gemini-1.5-pro");
        assert_eq!(bare_model("gemini-1.5-pro"), "gemini-1.5-pro");
    }
}
