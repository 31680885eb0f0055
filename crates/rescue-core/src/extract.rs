//! Recovery of a JSON plan object from free-form model output.
//!
//! Models are asked for bare JSON but regularly wrap it in code fences or
//! prose. Extraction runs an ordered list of pure strategies and keeps the
//! first one that yields a JSON object.

use std::sync::LazyLock;

use log::error;
use regex::Regex;
use serde_json::Value;

use crate::{
    error::{GatewayError, Result},
    sanitize::truncate_chars,
    upstream::MAX_ERROR_SNIPPET,
};

static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)```(?:json)?\s*([\s\S]*?)\s*```").expect("fenced block pattern")
});

/// One extraction attempt over the raw text.
pub type Strategy = fn(&str) -> Option<Value>;

/// Strategies in the order they are tried.
pub const STRATEGIES: [Strategy; 4] = [whole_text, fenced_block, outer_braces, shrinking_suffix];

fn parse_object(candidate: &str) -> Option<Value> {
    serde_json::from_str::<Value>(candidate)
        .ok()
        .filter(Value::is_object)
}

/// The text as-is.
pub fn whole_text(text: &str) -> Option<Value> {
    parse_object(text.trim())
}

/// The interior of the first fenced code block.
pub fn fenced_block(text: &str) -> Option<Value> {
    FENCED_BLOCK
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| parse_object(m.as_str()))
}

/// From the first `{` through the last `}`.
pub fn outer_braces(text: &str) -> Option<Value> {
    let first = text.find('{')?;
    let last = text.rfind('}')?;
    (last > first)
        .then(|| parse_object(&text[first..=last]))
        .flatten()
}

/// From the first `{`, cutting the end back until the prefix parses.
///
/// Only cuts ending in `}` can parse as an object, so other end positions
/// are skipped.
pub fn shrinking_suffix(text: &str) -> Option<Value> {
    let first = text.find('{')?;
    let candidate = &text[first..];
    candidate
        .rmatch_indices('}')
        .find_map(|(end, _)| parse_object(&candidate[..=end]))
}

/// Extracts the first JSON object any strategy recovers.
///
/// # Errors
///
/// Returns `GatewayError::Extraction` carrying the first 500 characters of
/// the text when every strategy fails.
pub fn extract_plan(text: &str) -> Result<Value> {
    if let Some(value) = STRATEGIES.iter().find_map(|strategy| strategy(text)) {
        return Ok(value);
    }

    let raw = truncate_chars(text, MAX_ERROR_SNIPPET);
    error!("Invalid model response, snippet: {raw}");
    Err(GatewayError::Extraction { raw })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_plain_json() {
        let value = extract_plan(r#"{"summary":"ok"}"#).expect("extract");
        assert_eq!(value, json!({ "summary": "ok" }));
    }

    #[test]
    fn test_fenced_json() {
        let text = "Here is the plan:\n```json\n{\"summary\":\"Evacuate\"}\n```\nStay safe.";
        let value = extract_plan(text).expect("extract");
        assert_eq!(value["summary"], "Evacuate");
        assert!(fenced_block(text).is_some());
    }

    #[test]
    fn test_untagged_fence() {
        let value = fenced_block("```\n{\"a\":1}\n```").expect("extract");
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn test_prose_wrapped_json() {
        let text = "Sure! {\"summary\":\"Open shelters\",\"risks\":[]} Hope this helps.";
        let value = extract_plan(text).expect("extract");
        assert_eq!(value["summary"], "Open shelters");
        assert!(outer_braces(text).is_some());
    }

    #[test]
    fn test_trailing_second_object_needs_shrinking() {
        let text = r#"{"summary":"first"} and also {"summary":"second"}"#;
        assert!(whole_text(text).is_none());
        assert!(outer_braces(text).is_none());

        let value = shrinking_suffix(text).expect("extract");
        assert_eq!(value["summary"], "first");
        assert_eq!(extract_plan(text).expect("extract")["summary"], "first");
    }

    #[test]
    fn test_non_object_json_rejected() {
        assert!(whole_text("[1, 2, 3]").is_none());
        assert!(whole_text("\"just a string\"").is_none());
    }

    #[test]
    fn test_braceless_prose_fails_with_snippet() {
        let text = "I cannot produce a plan for this request.".repeat(30);
        let err = extract_plan(&text).expect_err("should fail");

        match err {
            GatewayError::Extraction { raw } => assert_eq!(raw.chars().count(), 500),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unbalanced_braces_fail() {
        assert!(extract_plan("{\"summary\": \"cut off").is_err());
    }
}
