use crate::pipeline::{Candidate, GeneratedText};
use tracing::warn;

/// Returned whenever no assistant text could be isolated from raw output.
pub const EXTRACTION_FAILED: &str = "response extraction failed";

/// Marks the start of a model turn in Gemma-style flat output.
const MODEL_TURN_MARKER: &str = "<start_of_turn>model";
const MODEL_TURN_LINE: &str = "<start_of_turn>model\n";

/// Pulls the assistant's reply out of raw pipeline output for a single
/// request. Handles both the structured-chat and the flat-string shape, so
/// callers stay shape-agnostic. Never fails outward: any structural
/// mismatch degrades to [`EXTRACTION_FAILED`].
pub fn extract_reply(candidates: &[Candidate], original_prompt: &str) -> String {
    match try_extract(candidates, Some(original_prompt)) {
        Some(text) => text,
        None => {
            warn!("Could not extract assistant response from output: {candidates:?}");
            EXTRACTION_FAILED.to_string()
        }
    }
}

/// Batch variant: flat-string candidates are only trimmed. Batch output
/// carries no reliable prompt echo, so no stripping is attempted.
pub fn extract_reply_batch(candidates: &[Candidate]) -> String {
    match try_extract(candidates, None) {
        Some(text) => text,
        None => {
            warn!("Could not extract assistant response from batch output: {candidates:?}");
            EXTRACTION_FAILED.to_string()
        }
    }
}

fn try_extract(candidates: &[Candidate], original_prompt: Option<&str>) -> Option<String> {
    let first = candidates.first()?;

    let text = match &first.generated_text {
        GeneratedText::Chat(turns) => {
            let last = turns.last()?;
            if last.role != "assistant" {
                return None;
            }
            last.content.trim().to_string()
        }
        GeneratedText::Flat(full) => match original_prompt {
            Some(prompt) => {
                let continuation = strip_prompt_echo(full, prompt).trim();
                strip_turn_marker(continuation).trim().to_string()
            }
            None => full.trim().to_string(),
        },
    };

    if text.is_empty() { None } else { Some(text) }
}

/// Removes the echoed prompt from a flat continuation. Prefers a prefix
/// match; falls back to the first occurrence of the prompt inside the text.
/// If the prompt is absent the text is kept whole rather than mangled.
fn strip_prompt_echo<'a>(full: &'a str, prompt: &str) -> &'a str {
    if prompt.is_empty() {
        return full;
    }
    if let Some(rest) = full.strip_prefix(prompt) {
        return rest;
    }
    match full.find(prompt) {
        Some(index) => &full[index + prompt.len()..],
        None => full,
    }
}

fn strip_turn_marker(text: &str) -> &str {
    if !text.contains(MODEL_TURN_MARKER) {
        return text;
    }
    // Keep only what follows the last model-turn line.
    text.rsplit(MODEL_TURN_LINE).next().unwrap_or(text)
}
