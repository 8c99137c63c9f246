//! Wire shapes for the supported providers. Each provider is text-in / text-out.

use serde::{Deserialize, Serialize};

const MAX_TOKENS: u32 = 4096;

// ────────────────────────────────────────────────────────────────────────────
// Gemini (generateContent)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    role: &'a str,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

pub fn gemini_request(prompt: &str) -> GeminiRequest<'_> {
    GeminiRequest {
        contents: vec![GeminiContent {
            role: "user",
            parts: vec![GeminiPart { text: prompt }],
        }],
    }
}

/// Concatenates the text parts of the first candidate.
pub fn gemini_text(body: &str) -> Result<String, String> {
    let response: GeminiResponse =
        serde_json::from_str(body).map_err(|e| format!("JSON parse error: {e}"))?;

    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    non_empty(text)
}

// ────────────────────────────────────────────────────────────────────────────
// Anthropic (Messages API)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

pub fn anthropic_request<'a>(model: &'a str, prompt: &'a str) -> AnthropicRequest<'a> {
    AnthropicRequest {
        model,
        max_tokens: MAX_TOKENS,
        messages: vec![AnthropicMessage {
            role: "user",
            content: prompt,
        }],
    }
}

/// Extracts the text content from the first text block.
pub fn anthropic_text(body: &str) -> Result<String, String> {
    let response: AnthropicResponse =
        serde_json::from_str(body).map_err(|e| format!("JSON parse error: {e}"))?;

    let text = response
        .content
        .into_iter()
        .find(|b| b.block_type == "text")
        .and_then(|b| b.text)
        .unwrap_or_default();

    non_empty(text)
}

fn non_empty(text: String) -> Result<String, String> {
    if text.trim().is_empty() {
        Err("backend returned empty content".to_string())
    } else {
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gemini_request_shape() {
        let body = serde_json::to_value(gemini_request("hi")).unwrap();
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hi");
    }

    #[test]
    fn test_gemini_text_joins_parts() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"a"},{"text":"b"}]}}]}"#;
        assert_eq!(gemini_text(body).unwrap(), "ab");
    }

    #[test]
    fn test_gemini_text_without_candidates_is_error() {
        assert!(gemini_text(r#"{"candidates":[]}"#).is_err());
        assert!(gemini_text(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).is_err());
    }

    #[test]
    fn test_anthropic_request_shape() {
        let body = serde_json::to_value(anthropic_request("claude-sonnet-4-5", "hi")).unwrap();
        assert_eq!(body["model"], "claude-sonnet-4-5");
        assert_eq!(body["max_tokens"], 4096);
        assert_eq!(body["messages"][0]["content"], "hi");
    }

    #[test]
    fn test_anthropic_text_skips_non_text_blocks() {
        let body = r#"{"content":[{"type":"thinking"},{"type":"text","text":"answer"}]}"#;
        assert_eq!(anthropic_text(body).unwrap(), "answer");
    }

    #[test]
    fn test_anthropic_blank_text_is_error() {
        let body = r#"{"content":[{"type":"text","text":"   "}]}"#;
        assert!(anthropic_text(body).is_err());
    }
}
