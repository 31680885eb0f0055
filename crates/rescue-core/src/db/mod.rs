//! SQLite persistence for the key-value store.
//!
//! A [`Database`] wraps a single connection. Callers open one per operation
//! inside `spawn_blocking`, so the handle is never shared across tasks.

use std::path::Path;

use rusqlite::Connection;

use crate::error::{Result, StorageResultExt};

pub mod kv_queries;
pub mod schema;

/// Database connection and operations handler.
pub struct Database {
    connection: Connection,
}

impl Database {
    /// Opens the database at `path` and initializes the schema.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection = Connection::open(path).db_context("Failed to open database connection")?;

        let db = Self { connection };
        db.initialize_schema()?;
        Ok(db)
    }
}
