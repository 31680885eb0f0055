//! Plan model definition and the cached-plan wrapper.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ScenarioInput, UpdateEntry};

/// Structured action plan produced for an incident.
///
/// Model output is served as the JSON object the extractor recovered; this
/// typed view is used for rendering and for the offline template planner.
/// All fields default so that partially-shaped model output still renders.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Plan {
    /// When the plan was generated (ISO-8601)
    pub generated_at: String,

    pub scenario: ScenarioInput,

    /// Resources, constraints and updates the plan was built from
    pub inputs: PlanInputs,

    pub summary: String,

    pub priorities: Vec<String>,

    pub actions: Vec<String>,

    pub resources_plan: Vec<String>,

    pub risks: Vec<String>,
}

/// Parsed inputs echoed back inside a plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlanInputs {
    pub resources: Vec<String>,
    pub constraints: Vec<String>,
    pub updates: Vec<UpdateEntry>,
}

impl Plan {
    /// Best-effort typed view over an extracted plan object.
    pub fn from_value(value: &Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }
}

/// Bookkeeping stored next to a cached plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlanMeta {
    /// Fingerprint of the unresolved updates the plan was generated from
    pub update_sig: String,

    /// Backend model that produced the plan
    pub model: String,

    pub generated_at: String,
}

/// A generated plan stored under `data/plans/<incident>.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CachedPlan {
    /// Plan object exactly as returned to the caller
    pub plan: Value,

    #[serde(rename = "__meta")]
    pub meta: PlanMeta,
}

impl CachedPlan {
    /// Returns the plan if it was generated from the same update fingerprint.
    pub fn fresh_for(&self, update_sig: &str) -> Option<&Value> {
        (self.meta.update_sig == update_sig && self.plan.is_object()).then_some(&self.plan)
    }
}
