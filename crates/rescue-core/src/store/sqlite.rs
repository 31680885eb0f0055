//! SQLite-backed key-value store.

use std::{path::PathBuf, time::Duration};

use async_trait::async_trait;
use tokio::task;

use super::KvStore;
use crate::{
    db::Database,
    error::{GatewayError, Result},
};

/// Durable [`KvStore`] over a SQLite file.
///
/// Each operation opens its own connection on the blocking thread pool, so
/// the store is cheap to clone and share between request handlers.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db_path: PathBuf,
}

impl SqliteStore {
    /// Creates a store over an already-initialized database file.
    pub(crate) fn new(db_path: PathBuf) -> Self {
        Self { db_path }
    }
}

#[async_trait]
impl KvStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let db_path = self.db_path.clone();
        let key = key.to_string();

        task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.get_value(&key)
        })
        .await
        .map_err(GatewayError::join)?
    }

    async fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        let db_path = self.db_path.clone();
        let key = key.to_string();
        let value = value.to_string();

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.put_value(&key, &value, ttl.map(|ttl| ttl.as_secs()))
        })
        .await
        .map_err(GatewayError::join)?
    }
}
