//! Core library for the Rescue plan gateway.
//!
//! This crate holds everything behind the HTTP surface: input sanitization,
//! PII redaction, the key-value store abstraction, rate limiting, the plan
//! cache, prompt construction, upstream model calls with fallback, JSON
//! extraction from model replies and the incident store.
//!
//! # Display Architecture
//!
//! Domain models implement [`std::fmt::Display`] as markdown (see
//! [`display`]); the CLI renders that markdown in the terminal. The HTTP
//! layer serves the same models as JSON.
//!
//! # Quick Start
//!
//! ```rust
//! use rescue_core::{GatewayBuilder, template::{DraftInput, draft_plan}};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let gateway = GatewayBuilder::new()
//!     .with_memory_store()
//!     .build()
//!     .await?;
//!
//! let incidents = gateway.incidents()?;
//! incidents
//!     .put("flood-1", &json!({ "name": "Riverside flooding", "type": "Flood" }))
//!     .await?;
//!
//! let incident = incidents.get("flood-1").await?;
//! println!("{}", draft_plan(&DraftInput::from(&incident)));
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod db;
pub mod display;
pub mod error;
pub mod extract;
pub mod gateway;
pub mod incidents;
pub mod models;
pub mod prompt;
pub mod ratelimit;
pub mod redact;
pub mod sanitize;
pub mod store;
pub mod template;
pub mod upstream;

// Re-export commonly used types
pub use db::Database;
pub use display::LocalDateTime;
pub use error::{GatewayError, Result};
pub use gateway::{Gateway, GatewayBuilder, GatewayConfig};
pub use incidents::{IncidentStore, PutOutcome};
pub use models::{
    CachedPlan, Incident, IncidentManifest, Plan, PlanManifest, PlanRequest, UpdateEntry,
};
pub use ratelimit::RatePolicy;
pub use upstream::{ChatBackend, ModelSelector};
