// Shared prompt fragments.
// Each service that needs model calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// Appended to every template that expects structured output.
pub const JSON_ONLY_INSTRUCTION: &str = "\
    You MUST respond with valid JSON only. \
    Return ONLY a single JSON object matching the schema below. \
    Do NOT include explanations, apologies or any text outside the JSON object.";

/// Rendered in place of an empty conversation history so the backend sees
/// that no exchanges have happened yet.
pub const EMPTY_TRANSCRIPT_MARKER: &str = "(empty transcript: no prior exchanges)";

/// Rendered in place of an empty profile field.
pub const NOT_PROVIDED: &str = "(not provided)";
