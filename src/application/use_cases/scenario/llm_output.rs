//! Best-effort extraction of the JSON payload from an unreliable completion:
//! strips reasoning tags, unwraps a raw chat-completions envelope, removes
//! code fences, then parses into the expected shape.

use crate::domain::error::{AppError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;

static THINK_TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<think>[\s\S]*?</think>|<think\s*/>").unwrap());

static REASONING_TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<reasoning>[\s\S]*?</reasoning>").unwrap());

pub(crate) fn extract_json_payload(output: &str) -> String {
    let cleaned = THINK_TAG_PATTERN.replace_all(output, "");
    let cleaned = REASONING_TAG_PATTERN.replace_all(&cleaned, "");
    let trimmed = cleaned.trim();

    // Some gateways hand back the whole chat envelope instead of the content.
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        if let Some(content) = value
            .get("choices")
            .and_then(|choices| choices.get(0))
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(|content| content.as_str())
        {
            return strip_code_fence(content);
        }
        return trimmed.to_string();
    }
    strip_code_fence(trimmed)
}

fn strip_code_fence(value: &str) -> String {
    let trimmed = value.trim();
    if let Some(stripped) = trimmed.strip_prefix("```json") {
        return stripped.trim().trim_end_matches("```").trim().to_string();
    }
    if let Some(stripped) = trimmed.strip_prefix("```") {
        return stripped.trim().trim_end_matches("```").trim().to_string();
    }
    trimmed.to_string()
}

/// Parse the cleaned payload into `T`. Malformed JSON surfaces as
/// `ParseError` with a snippet of what was actually received; callers never
/// retry it.
pub(crate) fn parse_json<T: DeserializeOwned>(raw: &str, context: &str) -> Result<T> {
    let payload = extract_json_payload(raw);
    serde_json::from_str::<T>(&payload).map_err(|err| {
        AppError::ParseError(format!(
            "{}: {} | output_snippet={}",
            context,
            err,
            preview_text(&payload, 300)
        ))
    })
}

fn preview_text(value: &str, limit: usize) -> String {
    if value.chars().count() <= limit {
        return value.to_string();
    }
    let truncated: String = value.chars().take(limit).collect();
    format!("{}…", truncated)
}
