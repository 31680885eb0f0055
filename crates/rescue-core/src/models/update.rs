//! Crowd-sourced update model definition.

use serde::{Deserialize, Serialize};

/// A short timestamped note attached to an incident.
///
/// Updates carry no identifier of their own: an update is identified by its
/// `(ts, text)` pair, so two entries with the same pair cannot be told apart.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct UpdateEntry {
    /// Note text (at most 280 characters)
    pub text: String,

    /// ISO-8601 timestamp string as supplied by the reporter
    pub ts: String,

    /// Whether the update has been dealt with
    pub resolved: bool,
}

impl UpdateEntry {
    /// Creates an open (unresolved) update.
    pub fn new(text: impl Into<String>, ts: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ts: ts.into(),
            resolved: false,
        }
    }

    /// Returns true when this entry has exactly the given identity pair.
    pub fn is_identified_by(&self, ts: &str, text: &str) -> bool {
        self.ts == ts && self.text == text
    }

    /// Borrowed `{text, ts}` view used for fingerprints and prompts.
    pub fn projection(&self) -> UpdateRef<'_> {
        UpdateRef {
            text: &self.text,
            ts: &self.ts,
        }
    }
}

/// The `{text, ts}` projection of an update, serialized in that field order.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct UpdateRef<'a> {
    pub text: &'a str,
    pub ts: &'a str,
}
