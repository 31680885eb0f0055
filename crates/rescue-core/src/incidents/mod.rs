//! Incident records and their manifest.
//!
//! Each incident is stored as pretty-printed JSON under
//! `data/incidents/<id>.json` and listed in `data/incidents/index.json`.
//! The record is written first and the manifest second; if the manifest write
//! fails the record stays, and the next successful write for that id repairs
//! the index.

use std::sync::Arc;

use log::{info, warn};
use serde::Serialize;
use serde_json::Value;

use crate::{
    error::{GatewayError, Result},
    models::{Incident, IncidentManifest},
    sanitize::{MAX_INCIDENT_ID, clean_bool},
    store::{self, KvStore, keys},
};

pub mod ops;


pub use ops::UpdateOp;

/// Response body of a successful incident write.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PutOutcome {
    pub ok: bool,
    pub id: String,
    pub file: String,
}

/// Incident persistence over a key-value store.
#[derive(Clone)]
pub struct IncidentStore {
    store: Arc<dyn KvStore>,
}

impl IncidentStore {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// The incidents manifest, empty when nothing has been stored yet.
    pub async fn list(&self) -> Result<IncidentManifest> {
        Ok(store::get_json(&*self.store, keys::INCIDENT_INDEX)
            .await?
            .unwrap_or_default())
    }

    /// A stored incident by id.
    pub async fn get(&self, id: &str) -> Result<Incident> {
        if keys::is_reserved(id) {
            return Err(GatewayError::IncidentNotFound { id: id.to_string() });
        }
        store::get_json(&*self.store, &keys::incident(id))
            .await?
            .ok_or_else(|| GatewayError::IncidentNotFound { id: id.to_string() })
    }

    /// Creates or replaces the incident `id` from an untrusted body.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::InvalidInput` if the body is not an object,
    /// the path id is empty, too long or reserved, or the body names a
    /// different id.
    pub async fn put(&self, id: &str, body: &Value) -> Result<PutOutcome> {
        validate_id(id)?;
        if !body.is_object() {
            return Err(GatewayError::invalid_input("body").with_reason("Expected a JSON object"));
        }
        let body_id = body.get("id");
        if clean_bool(body_id) && body_id.and_then(Value::as_str) != Some(id) {
            return Err(GatewayError::invalid_input("id").with_reason("ID mismatch"));
        }

        let mut incident = Incident::sanitize(body);
        incident.id = id.to_string();

        store::put_json(&*self.store, &keys::incident(id), &incident).await?;

        let file = keys::incident_file(id);
        if let Err(e) = self.upsert_manifest(id, &file).await {
            warn!("Incident manifest update failed for {id}: {e}");
        }

        info!("Stored incident {id}");
        Ok(PutOutcome {
            ok: true,
            id: id.to_string(),
            file,
        })
    }

    /// Applies an add/resolve/delete operation to the incident's update log.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::InvalidInput` for a malformed operation or a
    /// reserved id, `GatewayError::IncidentNotFound` for an unknown
    /// incident, and `GatewayError::UpdateNotFound` when resolve/delete
    /// match nothing.
    pub async fn patch_update(&self, id: &str, body: &Value) -> Result<()> {
        validate_id(id)?;
        let op = UpdateOp::from_body(body)?;
        let mut incident = self.get(id).await?;

        op.apply(&mut incident.updates)?;

        store::put_json(&*self.store, &keys::incident(id), &incident).await?;
        info!("Updated update log of incident {id}");
        Ok(())
    }

    async fn upsert_manifest(&self, id: &str, file: &str) -> Result<()> {
        let mut manifest = self.list().await?;
        manifest.upsert(id, file);
        store::put_json(&*self.store, keys::INCIDENT_INDEX, &manifest).await
    }
}

impl std::fmt::Debug for IncidentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IncidentStore").finish_non_exhaustive()
    }
}

fn validate_id(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(GatewayError::invalid_input("id").with_reason("ID cannot be empty"));
    }
    if id.chars().count() > MAX_INCIDENT_ID {
        return Err(GatewayError::invalid_input("id")
            .with_reason(format!("ID cannot exceed {MAX_INCIDENT_ID} characters")));
    }
    if keys::is_reserved(id) {
        return Err(GatewayError::invalid_input("id").with_reason(format!("ID '{id}' is reserved")));
    }
    Ok(())
}
