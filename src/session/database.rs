//! Flow Database
//!
//! Durable storage for pipeline flow state, featuring:
//! - Connection pooling via r2d2 for concurrent access
//! - Version-tracked migrations
//! - WAL mode for optimal read/write performance

use std::path::Path;
use std::sync::Arc;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, OptionalExtension, params};

use crate::types::{Result, ResultExt};

/// Shared database handle for async contexts.
pub type SharedDatabase = Arc<FlowDatabase>;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS flow_state (
    key        TEXT PRIMARY KEY,
    payload    TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS meta (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
";

/// Current schema version for migration tracking
const SCHEMA_VERSION: u32 = 1;

struct Migration {
    version: u32,
    description: &'static str,
    up: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    description: "Add session_id column for direct lookup",
    up: "ALTER TABLE flow_state ADD COLUMN session_id TEXT",
}];

/// Connection pool configuration
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum number of connections in the pool
    pub max_size: u32,
    /// Timeout for acquiring a connection (seconds)
    pub connection_timeout_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        // The flow DB holds one small record per key; a handful of
        // connections is plenty.
        Self {
            max_size: 4,
            connection_timeout_secs: 30,
        }
    }
}

/// Thread-safe flow database with connection pooling.
pub struct FlowDatabase {
    pool: Pool<SqliteConnectionManager>,
}

impl FlowDatabase {
    /// Open database with connection pooling at the specified path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_config(path, PoolConfig::default())
    }

    /// Open database with custom pool configuration.
    pub fn open_with_config<P: AsRef<Path>>(path: P, config: PoolConfig) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }

        let manager =
            SqliteConnectionManager::file(path.as_ref()).with_init(Self::configure_connection);

        let pool = Pool::builder()
            .max_size(config.max_size)
            .connection_timeout(std::time::Duration::from_secs(
                config.connection_timeout_secs,
            ))
            .build(manager)
            .with_context("Failed to create connection pool")?;

        let db = Self { pool };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database for testing or temporary use.
    pub fn open_in_memory() -> Result<Self> {
        let manager = SqliteConnectionManager::memory().with_init(|conn| {
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
            Ok(())
        });

        // Single connection: each in-memory connection is its own database
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .with_context("Failed to create in-memory pool")?;

        let db = Self { pool };
        db.migrate()?;
        Ok(db)
    }

    fn configure_connection(conn: &mut Connection) -> std::result::Result<(), rusqlite::Error> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )?;
        Ok(())
    }

    fn connection(&self) -> Result<PooledConnection<SqliteConnectionManager>> {
        self.pool.get().with_context("Failed to acquire connection")
    }

    fn migrate(&self) -> Result<()> {
        let conn = self.connection()?;
        conn.execute_batch(SCHEMA)?;

        let current: u32 = conn
            .query_row(
                "SELECT value FROM meta WHERE key = 'schema_version'",
                [],
                |row| row.get::<_, String>(0),
            )
            .optional()?
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);

        for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
            tracing::debug!(
                version = migration.version,
                "Applying migration: {}",
                migration.description
            );
            conn.execute_batch(migration.up)?;
            conn.execute(
                "INSERT INTO meta (key, value) VALUES ('schema_version', ?1)
                 ON CONFLICT(key) DO UPDATE SET value = ?1",
                params![migration.version.to_string()],
            )?;
        }

        debug_assert!(MIGRATIONS.last().is_none_or(|m| m.version == SCHEMA_VERSION));
        Ok(())
    }

    // =========================================================================
    // Flow State Access
    // =========================================================================

    /// Upsert the payload stored under a key.
    pub fn save_flow(&self, key: &str, payload: &str, session_id: Option<&str>) -> Result<()> {
        let conn = self.connection()?;
        let now = chrono::Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO flow_state (key, payload, session_id, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(key) DO UPDATE SET payload = ?2, session_id = ?3, updated_at = ?4",
            params![key, payload, session_id, now],
        )?;
        Ok(())
    }

    /// Load the payload stored under a key, if any.
    pub fn load_flow(&self, key: &str) -> Result<Option<String>> {
        let conn = self.connection()?;
        let payload = conn
            .query_row(
                "SELECT payload FROM flow_state WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(payload)
    }

    /// Load the bare session identifier stored under a key, if any.
    pub fn load_session_id(&self, key: &str) -> Result<Option<String>> {
        let conn = self.connection()?;
        let id: Option<Option<String>> = conn
            .query_row(
                "SELECT session_id FROM flow_state WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id.flatten().filter(|id| !id.is_empty()))
    }

    /// Delete the record stored under a key.
    pub fn clear_flow(&self, key: &str) -> Result<()> {
        let conn = self.connection()?;
        conn.execute("DELETE FROM flow_state WHERE key = ?1", params![key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_load_clear() {
        let db = FlowDatabase::open_in_memory().unwrap();
        assert!(db.load_flow("k").unwrap().is_none());

        db.save_flow("k", "{\"a\":1}", Some("abc123")).unwrap();
        assert_eq!(db.load_flow("k").unwrap().unwrap(), "{\"a\":1}");
        assert_eq!(db.load_session_id("k").unwrap().unwrap(), "abc123");

        db.save_flow("k", "{\"a\":2}", None).unwrap();
        assert_eq!(db.load_flow("k").unwrap().unwrap(), "{\"a\":2}");
        assert!(db.load_session_id("k").unwrap().is_none());

        db.clear_flow("k").unwrap();
        assert!(db.load_flow("k").unwrap().is_none());
    }

    #[test]
    fn test_open_on_disk_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flow.db");

        {
            let db = FlowDatabase::open(&path).unwrap();
            db.save_flow("k", "persisted", Some("abc123")).unwrap();
        }

        let db = FlowDatabase::open(&path).unwrap();
        assert_eq!(db.load_flow("k").unwrap().unwrap(), "persisted");
    }

    #[test]
    fn test_empty_session_id_reads_as_none() {
        let db = FlowDatabase::open_in_memory().unwrap();
        db.save_flow("k", "{}", Some("")).unwrap();
        assert!(db.load_session_id("k").unwrap().is_none());
    }
}
