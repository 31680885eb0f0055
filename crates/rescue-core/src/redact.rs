//! PII redaction for text sent to the language model.
//!
//! Email addresses and phone numbers become `[REDACTED]`, links become
//! `[LINK]`. Redaction runs on a copy of the request right before prompt
//! construction; the fingerprint and the cached plan are computed from the
//! unredacted request.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::PlanRequest;

/// Placeholder for emails and phone numbers.
pub const REDACTED: &str = "[REDACTED]";

/// Placeholder for URLs.
pub const LINK: &str = "[LINK]";

static REDACTION_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    vec![
        // Email addresses
        (
            Regex::new(r"(?i)[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}").expect("email pattern"),
            REDACTED,
        ),
        // North American style phone numbers, optional country code
        (
            Regex::new(r"(?:\+?\d[\s.-]?)?\(?\d{3}\)?[\s.-]?\d{3}[\s.-]?\d{4}")
                .expect("phone pattern"),
            REDACTED,
        ),
        // http(s) links up to the next whitespace
        (
            Regex::new(r"(?i)https?://[^\s]+").expect("url pattern"),
            LINK,
        ),
    ]
});

/// Redacts PII patterns from a single string.
pub fn redact(text: &str) -> String {
    let mut result = text.to_string();

    for (pattern, replacement) in REDACTION_PATTERNS.iter() {
        result = pattern.replace_all(&result, *replacement).into_owned();
    }

    result
}

/// Returns a copy of the request with free text redacted.
///
/// Covers the scenario details and location plus every update text.
/// Scenario type, timestamps and options pass through untouched.
pub fn redact_request(request: &PlanRequest) -> PlanRequest {
    let mut redacted = request.clone();
    redacted.scenario.details = redact(&redacted.scenario.details);
    redacted.scenario.location = redact(&redacted.scenario.location);
    for update in &mut redacted.updates {
        update.text = redact(&update.text);
    }
    redacted
}
