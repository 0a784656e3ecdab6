// SQLite-backed key/value table

use crate::kv::{KvStore, validate_key};
use eyre::{Context, Result};
use rusqlite::{Connection, OptionalExtension};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Database file name inside the store directory
pub const DB_FILE: &str = "tasklist.db";

/// Stores values in a single `kv` table
pub struct SqliteKv {
    db: Connection,
}

impl SqliteKv {
    /// Open or create `<path>/tasklist.db`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let base_path = path.as_ref();
        fs::create_dir_all(base_path).context("Failed to create store directory")?;

        let db_path = base_path.join(DB_FILE);
        let db = Connection::open(&db_path).context("Failed to open SQLite database")?;
        Self::from_connection(db)
    }

    /// Private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let db = Connection::open_in_memory().context("Failed to open in-memory SQLite database")?;
        Self::from_connection(db)
    }

    fn from_connection(db: Connection) -> Result<Self> {
        let kv = Self { db };
        kv.create_schema()?;
        Ok(kv)
    }

    /// Get a reference to the SQLite database connection
    pub fn db(&self) -> &Connection {
        &self.db
    }

    fn create_schema(&self) -> Result<()> {
        debug!("Creating kv schema");

        self.db
            .execute_batch(
                r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
            )
            .context("Failed to create kv table")?;

        Ok(())
    }
}

impl KvStore for SqliteKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        validate_key(key)?;
        let value = self
            .db
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
            .optional()
            .wrap_err_with(|| format!("Failed to read key: {}", key))?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        debug!(key, bytes = value.len(), "SqliteKv::set: writing");
        self.db
            .execute(
                "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
                rusqlite::params![key, value],
            )
            .wrap_err_with(|| format!("Failed to write key: {}", key))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_creates_database() {
        let temp = TempDir::new().unwrap();
        let _kv = SqliteKv::open(temp.path()).unwrap();
        assert!(temp.path().join(DB_FILE).exists());
    }

    #[test]
    fn test_get_missing_key() {
        let kv = SqliteKv::open_in_memory().unwrap();
        assert_eq!(kv.get("tasks").unwrap(), None);
    }

    #[test]
    fn test_set_replaces_value() {
        let mut kv = SqliteKv::open_in_memory().unwrap();
        kv.set("tasks", "[1]").unwrap();
        kv.set("tasks", "[2]").unwrap();
        assert_eq!(kv.get("tasks").unwrap().as_deref(), Some("[2]"));

        let rows: i64 = kv
            .db()
            .query_row("SELECT COUNT(*) FROM kv", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn test_survives_reopen() {
        let temp = TempDir::new().unwrap();
        {
            let mut kv = SqliteKv::open(temp.path()).unwrap();
            kv.set("tasks", "persisted").unwrap();
        }
        let kv = SqliteKv::open(temp.path()).unwrap();
        assert_eq!(kv.get("tasks").unwrap().as_deref(), Some("persisted"));
    }

    #[test]
    fn test_rejects_invalid_key() {
        let mut kv = SqliteKv::open_in_memory().unwrap();
        assert!(kv.set("", "x").is_err());
    }
}
