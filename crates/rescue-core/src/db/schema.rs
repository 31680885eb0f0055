//! Database schema initialization.

use crate::error::{Result, StorageResultExt};

impl super::Database {
    /// Initializes the schema from the embedded SQL file.
    pub(super) fn initialize_schema(&self) -> Result<()> {
        // Concurrent writers from parallel requests wait instead of failing
        self.connection
            .busy_timeout(std::time::Duration::from_secs(5))
            .db_context("Failed to set busy timeout")?;

        let schema_sql = include_str!("../../assets/schema.sql");
        self.connection
            .execute_batch(schema_sql)
            .db_context("Failed to initialize database schema")
    }
}
