//! Response Extractor — turns free-form model text into a JSON value.
//!
//! Strategies, in order:
//! 1. A fenced code block tagged `json`, parsed strictly.
//! 2. The first balanced top-level `{ ... }` region, parsed strictly. Braces
//!    inside JSON string literals do not count toward nesting.
//! 3. Otherwise `Fallback`, keeping the original text verbatim.
//!
//! Malformed model output is expected, so nothing here returns an error or panics.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Why extraction did not produce a usable payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FallbackReason {
    NoJsonRegion,
    ParseError(String),
    /// Valid JSON that does not have the expected shape.
    SchemaMismatch(String),
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::NoJsonRegion => write!(f, "no JSON region found"),
            FallbackReason::ParseError(detail) => write!(f, "parse error: {detail}"),
            FallbackReason::SchemaMismatch(detail) => write!(f, "schema mismatch: {detail}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fallback {
    pub reason: FallbackReason,
    pub original_text: String,
}

/// Outcome of extraction. Consumers must branch on the variant; a `Fallback`
/// carries no payload to be mistaken for parsed data.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionResult {
    Parsed(Value),
    Fallback(Fallback),
}

pub fn extract(text: &str) -> ExtractionResult {
    let mut parse_error = None;

    if let Some(block) = fenced_json_block(text) {
        match serde_json::from_str::<Value>(block) {
            Ok(value) => return ExtractionResult::Parsed(value),
            Err(e) => parse_error = Some(e.to_string()),
        }
    }

    if let Some(region) = balanced_object(text) {
        match serde_json::from_str::<Value>(region) {
            Ok(value) => return ExtractionResult::Parsed(value),
            Err(e) => parse_error = Some(e.to_string()),
        }
    }

    let reason = match parse_error {
        Some(detail) => FallbackReason::ParseError(detail),
        None => FallbackReason::NoJsonRegion,
    };
    ExtractionResult::Fallback(Fallback {
        reason,
        original_text: text.to_string(),
    })
}

/// Extracts and deserializes in one step. Shape errors become
/// `FallbackReason::SchemaMismatch` so callers handle them like any other fallback.
pub fn extract_typed<T: DeserializeOwned>(text: &str) -> Result<T, Fallback> {
    match extract(text) {
        ExtractionResult::Parsed(value) => serde_json::from_value(value).map_err(|e| Fallback {
            reason: FallbackReason::SchemaMismatch(e.to_string()),
            original_text: text.to_string(),
        }),
        ExtractionResult::Fallback(fallback) => Err(fallback),
    }
}

/// Contents of the first ```json fenced block, if any. The tag is case-insensitive.
fn fenced_json_block(text: &str) -> Option<&str> {
    let mut rest = text;

    while let Some(open) = rest.find("```") {
        let after_open = &rest[open + 3..];
        let close = after_open.find("```")?;
        let block = &after_open[..close];

        let (info, body) = match block.find('\n') {
            Some(nl) => (&block[..nl], &block[nl + 1..]),
            None => (block, ""),
        };
        let info = info.trim();

        if info.eq_ignore_ascii_case("json") {
            return Some(body.trim());
        }
        // Single-line fence: ```json {"a": 1}```
        if body.is_empty()
            && info
                .get(..4)
                .is_some_and(|tag| tag.eq_ignore_ascii_case("json"))
            && info[4..].starts_with(char::is_whitespace)
        {
            return Some(info[4..].trim());
        }

        rest = &after_open[close + 3..];
    }

    None
}

/// The span from the first `{` to its matching `}`. `None` when unbalanced.
fn balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    None
}
