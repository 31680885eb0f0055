//! Normalization and bounding of untrusted input.
//!
//! Every function in this module is total: absent or wrong-typed fields fall
//! back to a safe default instead of producing an error. Strings are trimmed
//! and truncated by character count, numbers are coerced best-effort and
//! clamped, and arrays are cut to a maximum length before each element is
//! sanitized with the same rules.

use jiff::Timestamp;
use serde_json::Value;

use crate::{
    models::{
        Incident, PlanOptions, PlanRequest, ScenarioInput, UpdateEntry,
        request::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE},
    },
    store::keys,
};

pub const MAX_SCENARIO_TYPE: usize = 60;
pub const MAX_SCENARIO_LOCATION: usize = 120;
pub const MAX_SCENARIO_DETAILS: usize = 1200;
pub const MAX_POPULATION: u64 = 10_000_000;
pub const MAX_UPDATE_TEXT: usize = 280;
pub const MAX_REQUEST_TS: usize = 40;
pub const MAX_REQUEST_UPDATES: usize = 25;
pub const MAX_MODEL_NAME: usize = 64;
pub const MIN_MAX_TOKENS: u32 = 200;
pub const MAX_MAX_TOKENS: u32 = 1600;

pub const MAX_INCIDENT_ID: usize = 120;
pub const MAX_INCIDENT_NAME: usize = 120;
pub const MAX_INCIDENT_LABEL: usize = 40;
pub const MAX_INCIDENT_RESOURCES: usize = 1200;
pub const MAX_INCIDENT_CONSTRAINTS: usize = 1200;
pub const MAX_INCIDENT_DETAILS: usize = 2400;
pub const MAX_INCIDENT_TS: usize = 60;
pub const MAX_INCIDENT_UPDATES: usize = 500;

/// Truncates to at most `max` characters, never splitting a code point.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte, _)) => text[..byte].to_string(),
        None => text.to_string(),
    }
}

/// Trimmed, bounded string; non-strings become empty.
pub fn clean_str(value: Option<&Value>, max: usize) -> String {
    value
        .and_then(Value::as_str)
        .map(|s| truncate_chars(s.trim(), max))
        .unwrap_or_default()
}

/// Best-effort numeric coercion; anything non-finite becomes `default`.
pub fn clean_number(value: Option<&Value>, default: f64) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) if s.trim().is_empty() => Some(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(Value::Bool(b)) => Some(f64::from(u8::from(*b))),
        _ => None,
    };
    parsed.filter(|n| n.is_finite()).unwrap_or(default)
}

/// Truthiness: `true`, non-zero numbers and non-empty strings.
pub fn clean_bool(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_) | Value::Object(_)) => true,
        _ => false,
    }
}

/// Population clamped to `0..=10_000_000` and rounded down.
pub fn clean_population(value: Option<&Value>) -> u64 {
    let n = clean_number(value, 0.0).clamp(0.0, MAX_POPULATION as f64);
    // Clamped above, so the cast cannot truncate.
    n.floor() as u64
}

/// Elements of an array value, at most `max` of them.
fn bounded_array(value: Option<&Value>, max: usize) -> &[Value] {
    match value.and_then(Value::as_array) {
        Some(items) => &items[..items.len().min(max)],
        None => &[],
    }
}

impl ScenarioInput {
    /// Bounds a caller-supplied scenario object.
    pub fn sanitize(value: &Value) -> Self {
        Self {
            kind: clean_str(value.get("type"), MAX_SCENARIO_TYPE),
            location: clean_str(value.get("location"), MAX_SCENARIO_LOCATION),
            population: clean_population(value.get("population")),
            details: clean_str(value.get("details"), MAX_SCENARIO_DETAILS),
        }
    }
}

impl UpdateEntry {
    /// Bounds a caller-supplied update; `ts_max` differs between requests
    /// and stored incidents.
    pub fn sanitize(value: &Value, ts_max: usize) -> Self {
        Self {
            text: clean_str(value.get("text"), MAX_UPDATE_TEXT),
            ts: clean_str(value.get("ts"), ts_max),
            resolved: clean_bool(value.get("resolved")),
        }
    }
}

impl PlanOptions {
    /// Bounds caller-supplied generation options.
    pub fn sanitize(value: &Value) -> Self {
        let temperature = match value.get("temperature") {
            Some(Value::Number(n)) => n
                .as_f64()
                .map_or(DEFAULT_TEMPERATURE, |t| t.clamp(0.0, 1.0)),
            _ => DEFAULT_TEMPERATURE,
        };

        let requested = clean_number(value.get("max_tokens"), 0.0);
        let requested = if requested == 0.0 {
            f64::from(DEFAULT_MAX_TOKENS)
        } else {
            requested
        };
        let max_tokens = requested
            .round()
            .clamp(f64::from(MIN_MAX_TOKENS), f64::from(MAX_MAX_TOKENS)) as u32;

        Self {
            model: clean_str(value.get("model"), MAX_MODEL_NAME),
            temperature,
            max_tokens,
        }
    }
}

impl PlanRequest {
    /// Bounds a `POST /plan` body. Missing sections use their defaults.
    pub fn sanitize(body: &Value) -> Self {
        let null = Value::Null;
        let incident_id = clean_str(body.get("incidentId"), MAX_INCIDENT_ID);

        Self {
            scenario: ScenarioInput::sanitize(body.get("scenario").unwrap_or(&null)),
            updates: bounded_array(body.get("updates"), MAX_REQUEST_UPDATES)
                .iter()
                .map(|u| UpdateEntry::sanitize(u, MAX_REQUEST_TS))
                .collect(),
            options: PlanOptions::sanitize(body.get("options").unwrap_or(&null)),
            incident_id: Some(incident_id).filter(|id| !id.is_empty() && !keys::is_reserved(id)),
        }
    }
}

impl Incident {
    /// Bounds a full incident record. `createdAt` defaults to now.
    pub fn sanitize(value: &Value) -> Self {
        let kind = clean_str(value.get("type"), MAX_INCIDENT_LABEL);
        let status = clean_str(value.get("status"), MAX_INCIDENT_LABEL);
        let created_at = clean_str(value.get("createdAt"), MAX_INCIDENT_TS);

        Self {
            id: clean_str(value.get("id"), MAX_INCIDENT_ID),
            name: clean_str(value.get("name"), MAX_INCIDENT_NAME),
            kind: if kind.is_empty() { "Other".to_string() } else { kind },
            status: if status.is_empty() {
                "ongoing".to_string()
            } else {
                status
            },
            population: clean_population(value.get("population")),
            resources: clean_str(value.get("resources"), MAX_INCIDENT_RESOURCES),
            constraints: clean_str(value.get("constraints"), MAX_INCIDENT_CONSTRAINTS),
            details: clean_str(value.get("details"), MAX_INCIDENT_DETAILS),
            lat: clean_number(value.get("lat"), 0.0),
            lng: clean_number(value.get("lng"), 0.0),
            created_at: if created_at.is_empty() {
                Timestamp::now().to_string()
            } else {
                created_at
            },
            updates: bounded_array(value.get("updates"), MAX_INCIDENT_UPDATES)
                .iter()
                .map(|u| UpdateEntry::sanitize(u, MAX_INCIDENT_TS))
                .collect(),
        }
    }
}
