//! Key-value storage abstraction.
//!
//! Every piece of shared state (incident records, manifests, cached plans and
//! rate-limit windows) lives behind the [`KvStore`] trait as a JSON string
//! under a path-like key. Two implementations ship with the crate:
//!
//! - [`SqliteStore`]: durable, one connection per operation on the blocking
//!   pool
//! - [`MemoryStore`]: process-local, used for ephemeral servers and tests
//!
//! Writes to different keys are not transactional with respect to each
//! other; callers that maintain an index next to a record accept a short
//! window where the two disagree.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

use crate::error::Result;

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Async string key-value store with optional per-entry expiry.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Returns the value under `key`, or `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`. With a `ttl` the entry disappears once
    /// it elapses.
    async fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()>;
}

/// Storage key layout.
pub mod keys {
    /// Incidents manifest.
    pub const INCIDENT_INDEX: &str = "data/incidents/index.json";

    /// Cached plans manifest.
    pub const PLAN_INDEX: &str = "data/plans/index.json";

    /// Id whose record key would collide with a manifest key.
    pub const RESERVED_ID: &str = "index";

    /// Whether `id` cannot name an incident or plan record.
    pub fn is_reserved(id: &str) -> bool {
        id.eq_ignore_ascii_case(RESERVED_ID)
    }

    /// File name recorded for an incident in its manifest entry.
    pub fn incident_file(id: &str) -> String {
        format!("{id}.json")
    }

    pub fn incident(id: &str) -> String {
        format!("data/incidents/{id}.json")
    }

    /// Cached plan key; also recorded verbatim as the plan manifest `file`.
    pub fn plan(id: &str) -> String {
        format!("data/plans/{id}.json")
    }

    pub fn rate(caller: &str) -> String {
        format!("rate:{caller}")
    }
}

/// Reads and deserializes a JSON value.
pub async fn get_json<T: DeserializeOwned>(store: &dyn KvStore, key: &str) -> Result<Option<T>> {
    match store.get(key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Serializes `value` as pretty-printed JSON and stores it without expiry.
pub async fn put_json<T: Serialize + Sync>(store: &dyn KvStore, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string_pretty(value)?;
    store.put(key, &raw, None).await
}
