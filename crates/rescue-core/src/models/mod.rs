//! Data models for scenarios, incidents, updates and plans.
//!
//! Every model here is the *bounded* form of caller-supplied data: values are
//! produced by the sanitizer in [`crate::sanitize`] and never constructed from
//! raw JSON through serde on the write path. Serde derives exist so that the
//! records can be persisted and served back verbatim.
//!
//! Display implementations live in [`crate::display::models`].
//!
//! # Wire names
//!
//! The persisted and served JSON uses the camelCase names the browser client
//! expects (`generatedAt`, `resourcesPlan`, `createdAt`, `incidentId`), and
//! the scenario/incident category is serialized as `type`.

pub mod incident;
pub mod manifest;
pub mod plan;
pub mod request;
pub mod scenario;
pub mod update;


pub use incident::Incident;
pub use manifest::{IncidentIndexEntry, IncidentManifest, PlanIndexEntry, PlanManifest};
pub use plan::{CachedPlan, Plan, PlanInputs, PlanMeta};
pub use request::{PlanOptions, PlanRequest};
pub use scenario::ScenarioInput;
pub use update::{UpdateEntry, UpdateRef};
