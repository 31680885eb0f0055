//! Incident model definition.

use serde::{Deserialize, Serialize};

use super::UpdateEntry;

/// A tracked real-world emergency and its crowd-sourced update log.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Incident {
    /// Unique key, immutable after creation (at most 120 characters)
    pub id: String,

    pub name: String,

    /// Incident category, "Other" when not supplied
    #[serde(rename = "type")]
    pub kind: String,

    /// Lifecycle label, "ongoing" when not supplied
    pub status: String,

    pub population: u64,

    /// Free-form list of available resources
    pub resources: String,

    /// Free-form list of operating constraints
    pub constraints: String,

    pub details: String,

    pub lat: f64,

    pub lng: f64,

    pub created_at: String,

    /// Ordered update log (at most 500 entries)
    pub updates: Vec<UpdateEntry>,
}

impl Incident {
    /// Number of updates not yet marked resolved.
    pub fn open_update_count(&self) -> usize {
        self.updates.iter().filter(|u| !u.resolved).count()
    }
}
