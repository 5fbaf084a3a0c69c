//! # sift-store
//!
//! libSQL document store for sift.
//!
//! Holds one row per project for the phase-2 aggregate (as a JSON document
//! with a monotonically increasing `revision`), the deduplicated candidate
//! collection keyed by `(project_id, dedup_key)`, the latest search result
//! set, and the PRISMA counters.
//!
//! Every write that touches the aggregate goes through a [`StateTx`], an
//! immediate libSQL transaction that reads the latest snapshot, lets the
//! caller stage candidate and result-set writes, and commits the next
//! snapshot together with them.

pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod service;
pub mod tx;

#[cfg(test)]
mod test_support;

use error::DatabaseError;
use libsql::Builder;

pub use service::StoreService;
pub use tx::StateTx;

/// Milliseconds a writer waits on a lock held by another process.
const BUSY_TIMEOUT_MS: u32 = 5_000;

/// Central database handle.
pub struct SiftDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
    /// Serializes in-process writers on the shared connection.
    write_gate: tokio::sync::Mutex<()>,
}

impl SiftDb {
    /// Open a local database at the given path (`":memory:"` for tests).
    ///
    /// Runs migrations automatically on first open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Enable foreign keys (must be per-connection in SQLite)
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;
        conn.query(&format!("PRAGMA busy_timeout = {BUSY_TIMEOUT_MS}"), ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA busy_timeout: {e}")))?;

        let sift_db = Self {
            db,
            conn,
            write_gate: tokio::sync::Mutex::new(()),
        };
        sift_db.run_migrations().await?;
        tracing::debug!(path, "database opened");
        Ok(sift_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// Generate a prefixed ID via libSQL. Returns e.g., `"prj-a3f8b2c1"`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or returns no rows.
    pub async fn generate_id(&self, prefix: &str) -> Result<String, DatabaseError> {
        let mut rows = self
            .conn
            .query("SELECT ?1 || '-' || lower(hex(randomblob(4)))", [prefix])
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(row.get::<String>(0)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    async fn test_db() -> SiftDb {
        SiftDb::open_local(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn open_local_creates_schema() {
        let db = test_db().await;
        for table in ["projects", "phase2_state", "candidates", "result_sets", "prisma_counts"] {
            let mut rows = db
                .conn()
                .query(
                    "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
                    [table],
                )
                .await
                .unwrap();
            assert!(rows.next().await.unwrap().is_some(), "table '{table}' should exist");
        }
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let db = test_db().await;
        db.run_migrations().await.unwrap();
    }

    #[tokio::test]
    async fn generate_id_is_prefixed_and_unique() {
        let db = test_db().await;
        let mut seen = HashSet::new();
        for _ in 0..50 {
            let id = db.generate_id("prj").await.unwrap();
            assert!(id.starts_with("prj-"));
            assert_eq!(id.len(), 12);
            assert!(seen.insert(id));
        }
    }

    #[tokio::test]
    async fn file_database_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sift.db");
        let path = path.to_str().unwrap();
        {
            let db = SiftDb::open_local(path).await.unwrap();
            db.conn()
                .execute(
                    "INSERT INTO projects (id, name) VALUES ('prj-1', 'Review')",
                    (),
                )
                .await
                .unwrap();
        }
        let db = SiftDb::open_local(path).await.unwrap();
        let mut rows = db.conn().query("SELECT name FROM projects", ()).await.unwrap();
        let row = rows.next().await.unwrap().unwrap();
        assert_eq!(row.get::<String>(0).unwrap(), "Review");
    }
}
