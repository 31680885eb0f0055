//! Plan generation request model.

use serde::{Deserialize, Serialize};

use super::{ScenarioInput, UpdateEntry};

/// Default sampling temperature when the caller supplies none.
pub const DEFAULT_TEMPERATURE: f64 = 0.2;

/// Default completion budget when the caller supplies none.
pub const DEFAULT_MAX_TOKENS: u32 = 800;

/// Generation options supplied by the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanOptions {
    /// Explicit model name; empty means "choose heuristically"
    pub model: String,

    /// Sampling temperature in `[0, 1]`
    pub temperature: f64,

    /// Completion budget in `[200, 1600]`
    pub max_tokens: u32,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            model: String::new(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

/// A sanitized `POST /plan` request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
    pub scenario: ScenarioInput,

    /// At most 25 updates, in caller order
    pub updates: Vec<UpdateEntry>,

    pub options: PlanOptions,

    /// Incident the plan belongs to; enables plan caching
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incident_id: Option<String>,
}

impl PlanRequest {
    /// Updates that still feed generation, in caller order.
    pub fn open_updates(&self) -> impl Iterator<Item = &UpdateEntry> {
        self.updates.iter().filter(|u| !u.resolved)
    }

    /// The caller's explicit model choice, if any.
    pub fn explicit_model(&self) -> Option<&str> {
        Some(self.options.model.as_str()).filter(|m| !m.is_empty())
    }
}
