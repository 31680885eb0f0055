//! Scenario model definition.

use serde::{Deserialize, Serialize};

/// Caller-described incident scenario that drives plan generation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScenarioInput {
    /// Disaster category, e.g. "Flood" (at most 60 characters)
    #[serde(rename = "type")]
    pub kind: String,

    /// Free-form location (at most 120 characters)
    pub location: String,

    /// Affected population, clamped to `0..=10_000_000`
    pub population: u64,

    /// Free-form situation details (at most 1200 characters)
    pub details: String,
}
