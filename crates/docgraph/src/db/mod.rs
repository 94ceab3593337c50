//! `SQLite` storage layer for docgraph.
//!
//! `SQLite` is the source of truth for the call graph. Connections come from
//! an r2d2 pool: every operation acquires one, uses it, and returns it to the
//! pool when the guard drops, on success and error paths alike.
//!
//! ## Module Structure
//!
//! - `schema` - Database schema (DDL)
//! - `helpers` - Row conversion utilities and column lists
//! - `ingest` - Batch ingestion (the only write path)
//! - `queries` - Graph queries and table listings

mod helpers;
mod ingest;
mod queries;
mod schema;

use std::path::{Path, PathBuf};
use std::time::Duration;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use tracing::{debug, info};

use crate::config::DatabaseConfig;
use crate::error::Result;
use crate::types::IndexStats;

/// A connection checked out of the pool.
pub type PooledConn = PooledConnection<SqliteConnectionManager>;

/// Applies per-connection pragmas whenever the pool hands out a connection.
#[derive(Debug)]
struct ConnectionCustomizer {
    busy_timeout: Duration,
}

impl r2d2::CustomizeConnection<Connection, rusqlite::Error> for ConnectionCustomizer {
    fn on_acquire(&self, conn: &mut Connection) -> std::result::Result<(), rusqlite::Error> {
        conn.busy_timeout(self.busy_timeout)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(())
    }
}

/// Handle to the persistent call-graph store.
///
/// Cheap to clone; clones share the same pool.
#[derive(Clone)]
pub struct Store {
    pool: Pool<SqliteConnectionManager>,
    path: PathBuf,
}

impl Store {
    /// Open or create the store and make sure the schema exists.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) for out-of-range
    /// settings. Also fails if the parent directory cannot be created, the
    /// pool cannot open its connections, or the schema DDL fails.
    pub fn open(config: &DatabaseConfig) -> Result<Self> {
        config.validate()?;
        let path = config.path.clone();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        debug!(
            path = %path.display(),
            pool_size = config.pool_size,
            min_idle = config.pool_min_idle,
            "Initializing connection pool"
        );

        let manager = SqliteConnectionManager::file(&path);
        let pool = Pool::builder()
            .max_size(config.pool_size)
            .min_idle(Some(config.pool_min_idle))
            .connection_timeout(config.busy_timeout())
            .connection_customizer(Box::new(ConnectionCustomizer {
                busy_timeout: config.busy_timeout(),
            }))
            .build(manager)?;

        let store = Self { pool, path };
        store.ensure_schema()?;
        info!(path = %store.path.display(), "Store ready");
        Ok(store)
    }

    /// Path of the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Acquire a pooled connection.
    ///
    /// The connection is returned to the pool when the guard is dropped.
    pub(crate) fn connection(&self) -> Result<PooledConn> {
        Ok(self.pool.get()?)
    }

    /// Create the tables if they are absent. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if a connection cannot be acquired or the DDL fails.
    pub fn ensure_schema(&self) -> Result<()> {
        let conn = self.connection()?;
        schema::ensure_schema(&conn)
    }

    /// Row counts for each table.
    ///
    /// # Errors
    ///
    /// Returns an error on store failure.
    pub fn stats(&self) -> Result<IndexStats> {
        let conn = self.connection()?;
        let count = |table: &str| -> Result<usize> {
            let n: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                row.get(0)
            })?;
            // COUNT(*) is never negative
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            Ok(n as usize)
        };

        Ok(IndexStats {
            projects: count("projects")?,
            documents: count("documents")?,
            classes: count("classes")?,
            methods: count("methods")?,
            method_calls: count("method_calls")?,
        })
    }

    /// Delete every row from every table.
    ///
    /// This is the only delete path; ingestion never removes rows.
    ///
    /// # Errors
    ///
    /// Returns an error on store failure; nothing is deleted in that case.
    pub fn clear(&self) -> Result<()> {
        info!(path = %self.path.display(), "Clearing store");
        let mut conn = self.connection()?;
        let tx = conn.transaction()?;
        for table in schema::TABLES.iter().rev() {
            tx.execute(&format!("DELETE FROM {table}"), [])?;
        }
        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::batch::ProjectBatch;
    use tempfile::TempDir;

    pub(crate) fn temp_store() -> (TempDir, Store) {
        let dir = tempfile::tempdir().expect("should create temp directory");
        let config = DatabaseConfig {
            path: dir.path().join("test.db"),
            pool_size: 2,
            ..DatabaseConfig::default()
        };
        let store = Store::open(&config).expect("should open store");
        (dir, store)
    }

    #[test]
    fn open_creates_database_file_in_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig {
            path: dir.path().join("nested").join("index.db"),
            ..DatabaseConfig::default()
        };

        let store = Store::open(&config).unwrap();

        assert!(store.path().exists());
        assert_eq!(store.stats().unwrap(), IndexStats::default());
    }

    #[test]
    fn open_rejects_zero_busy_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig {
            path: dir.path().join("index.db"),
            busy_timeout_ms: 0,
            ..DatabaseConfig::default()
        };

        let result = Store::open(&config);

        assert!(matches!(result, Err(crate::Error::Config(_))));
        assert!(!config.path.exists());
    }

    #[test]
    fn pooled_connections_enable_foreign_keys() {
        let (_dir, store) = temp_store();
        let conn = store.connection().unwrap();

        let enabled: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 1);
    }

    #[test]
    fn reopening_keeps_data() {
        let (dir, store) = temp_store();
        store
            .ingest(&ProjectBatch::new("P", "d.cs").class("P.C"))
            .unwrap();
        drop(store);

        let config = DatabaseConfig {
            path: dir.path().join("test.db"),
            ..DatabaseConfig::default()
        };
        let reopened = Store::open(&config).unwrap();

        let stats = reopened.stats().unwrap();
        assert_eq!(stats.projects, 1);
        assert_eq!(stats.classes, 1);
    }

    #[test]
    fn clear_removes_all_rows() {
        let (_dir, store) = temp_store();
        store
            .ingest(
                &ProjectBatch::new("P", "d.cs")
                    .class("P.C")
                    .method("P.C.Foo()", "return 1;")
                    .method("P.C.Bar()", "Foo();")
                    .call("P.C.Bar()", "P.C.Foo()"),
            )
            .unwrap();

        store.clear().unwrap();

        assert_eq!(store.stats().unwrap(), IndexStats::default());
    }
}
