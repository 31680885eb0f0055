//! Manifest (index) models for incidents and cached plans.

use serde::{Deserialize, Serialize};

/// One row of the incidents index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IncidentIndexEntry {
    pub id: String,
    pub file: String,
}

/// Index of stored incidents, persisted as `data/incidents/index.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IncidentManifest {
    #[serde(default)]
    pub incidents: Vec<IncidentIndexEntry>,
}

impl IncidentManifest {
    /// Inserts or replaces the entry for `id`, keeping existing order.
    pub fn upsert(&mut self, id: &str, file: &str) {
        let entry = IncidentIndexEntry {
            id: id.to_string(),
            file: file.to_string(),
        };
        match self.incidents.iter_mut().find(|e| e.id == id) {
            Some(existing) => *existing = entry,
            None => self.incidents.push(entry),
        }
    }
}

/// One row of the plans index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlanIndexEntry {
    pub id: String,
    pub file: String,
    pub updated_at: String,
}

/// Index of cached plans, persisted as `data/plans/index.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlanManifest {
    #[serde(default)]
    pub plans: Vec<PlanIndexEntry>,
}

impl PlanManifest {
    /// Inserts or refreshes the entry for `id`.
    pub fn upsert(&mut self, id: &str, file: &str, updated_at: &str) {
        match self.plans.iter_mut().find(|e| e.id == id) {
            Some(existing) => {
                existing.file = file.to_string();
                existing.updated_at = updated_at.to_string();
            }
            None => self.plans.push(PlanIndexEntry {
                id: id.to_string(),
                file: file.to_string(),
                updated_at: updated_at.to_string(),
            }),
        }
    }
}
