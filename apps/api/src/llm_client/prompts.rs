// Shared prompt constants and prompt-building utilities.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System instruction that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// System instruction for plain-text generation calls.
pub const PLAIN_TEXT_SYSTEM: &str = "You are an experienced interviewer at a top technology company. \
    Respond with plain text only. Do NOT use markdown headings, bullet lists or code fences \
    unless the content itself requires code.";

/// Truncates `text` to at most `max_chars` characters on a char boundary,
/// marking the cut so the model knows the excerpt is partial.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}\n[...truncated]", text[..cut].trim_end()),
        None => text.to_string(),
    }
}
