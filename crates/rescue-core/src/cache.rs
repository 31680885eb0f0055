//! Update fingerprints and the per-incident plan cache.
//!
//! A generated plan is cached under its incident together with the
//! fingerprint of the unresolved updates it was built from. A later request
//! for the same incident whose fingerprint matches is answered from the cache
//! without calling the model.

use std::sync::Arc;

use jiff::Timestamp;
use log::{debug, warn};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::{
    error::{GatewayError, Result},
    models::{CachedPlan, PlanManifest, PlanMeta, UpdateEntry, UpdateRef},
    store::{self, KvStore, keys},
};

/// SHA-256 hex digest of the `[{text, ts}, ...]` projection of `updates`.
///
/// Order-sensitive: the same updates in a different order produce a
/// different fingerprint. The `resolved` flag is not part of the projection;
/// callers pass only the open updates.
pub fn update_signature<'a>(updates: impl IntoIterator<Item = &'a UpdateEntry>) -> String {
    let projection: Vec<UpdateRef<'_>> = updates.into_iter().map(UpdateEntry::projection).collect();
    // Serializing borrowed strings cannot fail.
    let serialized = serde_json::to_string(&projection).unwrap_or_default();
    hex::encode(Sha256::digest(serialized.as_bytes()))
}

/// Plan cache and plans manifest over a key-value store.
#[derive(Clone)]
pub struct PlanCache {
    store: Arc<dyn KvStore>,
}

impl PlanCache {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Returns the cached plan for `incident_id` if it matches `update_sig`.
    ///
    /// Read and decode failures are logged and treated as a miss.
    pub async fn lookup(&self, incident_id: &str, update_sig: &str) -> Option<Value> {
        let cached = match store::get_json::<CachedPlan>(&*self.store, &keys::plan(incident_id)).await
        {
            Ok(cached) => cached,
            Err(e) => {
                warn!("Plan cache read failed for {incident_id}: {e}");
                return None;
            }
        };

        let hit = cached
            .as_ref()
            .and_then(|c| c.fresh_for(update_sig))
            .cloned();
        if hit.is_some() {
            debug!("Plan cache hit for {incident_id}");
        } else {
            debug!("Plan cache miss for {incident_id}");
        }
        hit
    }

    /// Writes `plan` as the current cached plan for `incident_id` and
    /// refreshes its manifest entry.
    ///
    /// A failed manifest write is logged; the plan itself stays written.
    pub async fn store(
        &self,
        incident_id: &str,
        plan: &Value,
        update_sig: &str,
        model: &str,
    ) -> Result<()> {
        let now = Timestamp::now().to_string();
        let file = keys::plan(incident_id);
        let cached = CachedPlan {
            plan: plan.clone(),
            meta: PlanMeta {
                update_sig: update_sig.to_string(),
                model: model.to_string(),
                generated_at: now.clone(),
            },
        };
        store::put_json(&*self.store, &file, &cached).await?;

        if let Err(e) = self.upsert_manifest(incident_id, &file, &now).await {
            warn!("Plan manifest update failed for {incident_id}: {e}");
        }
        Ok(())
    }

    async fn upsert_manifest(&self, incident_id: &str, file: &str, updated_at: &str) -> Result<()> {
        let mut manifest = self.list().await?;
        manifest.upsert(incident_id, file, updated_at);
        store::put_json(&*self.store, keys::PLAN_INDEX, &manifest).await
    }

    /// The plans manifest, empty when nothing has been cached yet.
    pub async fn list(&self) -> Result<PlanManifest> {
        Ok(store::get_json(&*self.store, keys::PLAN_INDEX)
            .await?
            .unwrap_or_default())
    }

    /// The cached plan artifact for `incident_id`.
    pub async fn get(&self, incident_id: &str) -> Result<CachedPlan> {
        if keys::is_reserved(incident_id) {
            return Err(GatewayError::PlanNotFound {
                id: incident_id.to_string(),
            });
        }
        store::get_json(&*self.store, &keys::plan(incident_id))
            .await?
            .ok_or_else(|| GatewayError::PlanNotFound {
                id: incident_id.to_string(),
            })
    }
}

impl std::fmt::Debug for PlanCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlanCache").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::store::MemoryStore;

    fn updates() -> Vec<UpdateEntry> {
        vec![
            UpdateEntry::new("Bridge A closed", "2025-09-11T10:00:00Z"),
            UpdateEntry::new("Shelter B at capacity", "2025-09-11T10:30:00Z"),
        ]
    }

    #[test]
    fn test_signature_is_stable() {
        assert_eq!(update_signature(&updates()), update_signature(&updates()));
        assert_eq!(update_signature(&updates()).len(), 64);
    }

    #[test]
    fn test_signature_sensitive_to_text_ts_and_membership() {
        let base = update_signature(&updates());

        let mut text_changed = updates();
        text_changed[0].text = "Bridge A reopened".to_string();
        assert_ne!(update_signature(&text_changed), base);

        let mut ts_changed = updates();
        ts_changed[1].ts = "2025-09-11T10:31:00Z".to_string();
        assert_ne!(update_signature(&ts_changed), base);

        let mut added = updates();
        added.push(UpdateEntry::new("Power out", "2025-09-11T11:00:00Z"));
        assert_ne!(update_signature(&added), base);

        let all = updates();
        assert_ne!(update_signature(&all[..1]), base);

        let mut reordered = updates();
        reordered.reverse();
        assert_ne!(update_signature(&reordered), base);
    }

    #[test]
    fn test_signature_ignores_resolved_flag() {
        let mut flagged = updates();
        flagged[0].resolved = true;
        assert_eq!(update_signature(&flagged), update_signature(&updates()));
    }

    #[test]
    fn test_signature_of_no_updates_is_hash_of_empty_list() {
        assert_eq!(
            update_signature(&[]),
            hex::encode(Sha256::digest(b"[]"))
        );
    }

    #[tokio::test]
    async fn test_store_then_lookup() {
        let cache = PlanCache::new(Arc::new(MemoryStore::new()));
        let plan = json!({ "summary": "Evacuate zone A" });

        cache
            .store("flood-1", &plan, "sig-1", "openai/gpt-oss-20b")
            .await
            .expect("store");

        assert_eq!(cache.lookup("flood-1", "sig-1").await, Some(plan));
        assert_eq!(cache.lookup("flood-1", "sig-2").await, None);
        assert_eq!(cache.lookup("fire-2", "sig-1").await, None);
    }

    #[tokio::test]
    async fn test_store_maintains_manifest() {
        let cache = PlanCache::new(Arc::new(MemoryStore::new()));
        let plan = json!({ "summary": "x" });

        cache.store("flood-1", &plan, "a", "m").await.expect("store");
        cache.store("fire-2", &plan, "b", "m").await.expect("store");
        cache.store("flood-1", &plan, "c", "m").await.expect("store");

        let manifest = cache.list().await.expect("list");
        assert_eq!(manifest.plans.len(), 2);
        assert_eq!(manifest.plans[0].id, "flood-1");
        assert_eq!(manifest.plans[0].file, "data/plans/flood-1.json");

        let cached = cache.get("flood-1").await.expect("get");
        assert_eq!(cached.meta.update_sig, "c");
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_a_miss() {
        let store: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
        store
            .put("data/plans/flood-1.json", "{ truncated", None)
            .await
            .expect("seed");
        let cache = PlanCache::new(store);

        assert_eq!(cache.lookup("flood-1", "sig").await, None);
    }

    #[tokio::test]
    async fn test_missing_plan_is_not_found() {
        let cache = PlanCache::new(Arc::new(MemoryStore::new()));
        let err = cache.get("nope").await.expect_err("should be missing");
        assert_eq!(err.status_code(), 404);
        assert!(cache.list().await.expect("list").plans.is_empty());
    }
}
