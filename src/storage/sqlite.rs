//! SQLite content store implementation
//!
//! This module provides a SQLite-based implementation of the ContentStore trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{ContentStore, StoreError, StoreKey, StoreOutcome, StoreResult};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// SQLite content store backend
pub struct SqliteStore {
    conn: Mutex<Connection>,
    prefix: String,
}

impl SqliteStore {
    /// Opens (or creates) a store database at `path`
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    /// * `prefix` - Prefix prepended to every object key
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStore)` - Successfully opened/created database
    /// * `Err(StoreError)` - Failed to open database
    pub fn new(path: &Path, prefix: &str) -> StoreResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
            prefix: prefix.to_string(),
        })
    }

    /// Creates an in-memory database
    pub fn new_in_memory(prefix: &str) -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            prefix: prefix.to_string(),
        })
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StoreError::Database(format!("connection lock poisoned: {}", e)))
    }

    /// Returns the payload stored under `key`, if any
    pub fn get_payload(&self, key: &StoreKey) -> StoreResult<Option<String>> {
        let conn = self.lock()?;
        let payload = conn
            .query_row(
                "SELECT payload FROM stored_pages WHERE key = ?1",
                params![key.object_key(&self.prefix)],
                |row| row.get(0),
            )
            .optional()?;
        Ok(payload)
    }

    /// Counts stored pages
    pub fn count_pages(&self) -> StoreResult<u64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM stored_pages", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

#[async_trait]
impl ContentStore for SqliteStore {
    async fn store_if_absent(&self, key: &StoreKey, payload: &str) -> StoreResult<StoreOutcome> {
        let conn = self.lock()?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO stored_pages (key, url, payload, stored_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                key.object_key(&self.prefix),
                key.url(),
                payload,
                Utc::now().to_rfc3339()
            ],
        )?;

        if inserted == 1 {
            Ok(StoreOutcome::written())
        } else {
            Ok(StoreOutcome::already_present())
        }
    }

    async fn contains(&self, key: &StoreKey) -> StoreResult<bool> {
        let conn = self.lock()?;
        let found: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM stored_pages WHERE key = ?1",
                params![key.object_key(&self.prefix)],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn name(&self) -> &'static str {
        "sqlite"
    }
}
