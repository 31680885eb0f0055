//! Key-value reads and writes with optional expiry.

use jiff::Timestamp;
use rusqlite::{OptionalExtension, params};

use crate::error::{Result, StorageResultExt};

const SELECT_VALUE_SQL: &str =
    "SELECT value FROM kv WHERE key = ?1 AND (expires_at IS NULL OR expires_at > ?2)";
const UPSERT_VALUE_SQL: &str = "INSERT INTO kv (key, value, expires_at, updated_at) VALUES (?1, ?2, ?3, ?4) \
     ON CONFLICT(key) DO UPDATE SET value = excluded.value, expires_at = excluded.expires_at, updated_at = excluded.updated_at";
const PURGE_EXPIRED_SQL: &str =
    "DELETE FROM kv WHERE expires_at IS NOT NULL AND expires_at <= ?1";

impl super::Database {
    /// Returns the live value under `key`, ignoring expired rows.
    pub fn get_value(&self, key: &str) -> Result<Option<String>> {
        let now = Timestamp::now().as_second();
        self.connection
            .query_row(SELECT_VALUE_SQL, params![key, now], |row| row.get(0))
            .optional()
            .db_context("Failed to read value")
    }

    /// Writes `value` under `key`, replacing any previous value.
    ///
    /// `ttl_secs` of `None` stores the value without expiry. Expired rows are
    /// purged in the same transaction.
    pub fn put_value(&mut self, key: &str, value: &str, ttl_secs: Option<u64>) -> Result<()> {
        let now = Timestamp::now();
        let expires_at = ttl_secs.map(|ttl| now.as_second().saturating_add_unsigned(ttl));

        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        tx.execute(PURGE_EXPIRED_SQL, params![now.as_second()])
            .db_context("Failed to purge expired values")?;
        tx.execute(
            UPSERT_VALUE_SQL,
            params![key, value, expires_at, now.to_string()],
        )
        .db_context("Failed to write value")?;

        tx.commit().db_context("Failed to commit transaction")
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::super::Database;

    fn open() -> (TempDir, Database) {
        let dir = TempDir::new().expect("tempdir");
        let db = Database::new(dir.path().join("test.db")).expect("open database");
        (dir, db)
    }

    #[test]
    fn test_put_then_get() {
        let (_dir, mut db) = open();
        db.put_value("data/incidents/a.json", "{}", None)
            .expect("put");
        assert_eq!(
            db.get_value("data/incidents/a.json").expect("get"),
            Some("{}".to_string())
        );
        assert_eq!(db.get_value("missing").expect("get"), None);
    }

    #[test]
    fn test_put_overwrites() {
        let (_dir, mut db) = open();
        db.put_value("k", "1", None).expect("put");
        db.put_value("k", "2", None).expect("put");
        assert_eq!(db.get_value("k").expect("get"), Some("2".to_string()));
    }

    #[test]
    fn test_zero_ttl_is_expired_immediately() {
        let (_dir, mut db) = open();
        db.put_value("rate:1.2.3.4", "{}", Some(0)).expect("put");
        assert_eq!(db.get_value("rate:1.2.3.4").expect("get"), None);
    }
}
