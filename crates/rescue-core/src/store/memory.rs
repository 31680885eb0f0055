//! Process-local key-value store.

use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::KvStore;
use crate::error::Result;

#[derive(Debug)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

/// In-memory [`KvStore`] honoring TTLs. Contents are lost on drop.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().await;
        let now = Instant::now();
        Ok(entries
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value.clone()))
    }

    async fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        entries.retain(|_, entry| entry.is_live(now));
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: ttl.map(|ttl| now + ttl),
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_overwrite() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").await.expect("get"), None);

        store.put("k", "1", None).await.expect("put");
        store.put("k", "2", None).await.expect("put");
        assert_eq!(store.get("k").await.expect("get"), Some("2".to_string()));
    }

    #[tokio::test]
    async fn test_expired_entries_are_absent() {
        let store = MemoryStore::new();
        store
            .put("rate:a", "{}", Some(Duration::ZERO))
            .await
            .expect("put");
        assert_eq!(store.get("rate:a").await.expect("get"), None);

        store
            .put("rate:b", "{}", Some(Duration::from_secs(60)))
            .await
            .expect("put");
        assert!(store.get("rate:b").await.expect("get").is_some());
    }
}
