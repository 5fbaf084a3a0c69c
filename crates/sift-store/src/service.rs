//! Service layer over `SiftDb`.
//!
//! All repository methods are implemented as `impl StoreService` blocks in
//! [`crate::repos`]. Writes that touch the phase-2 aggregate go through
//! [`StoreService::begin`].

use libsql::TransactionBehavior;

use crate::SiftDb;
use crate::error::DatabaseError;
use crate::tx::StateTx;

pub struct StoreService {
    db: SiftDb,
}

impl StoreService {
    /// Open (and migrate) a local database.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn new_local(db_path: &str) -> Result<Self, DatabaseError> {
        Ok(Self {
            db: SiftDb::open_local(db_path).await?,
        })
    }

    #[must_use]
    pub const fn from_db(db: SiftDb) -> Self {
        Self { db }
    }

    #[must_use]
    pub const fn db(&self) -> &SiftDb {
        &self.db
    }

    /// Start a read-modify-write of a project's phase-2 aggregate.
    ///
    /// Takes the in-process write gate, opens an immediate transaction (so
    /// other processes block instead of racing), and loads the latest
    /// snapshot. Dropping the returned [`StateTx`] without committing rolls
    /// everything back.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the project has no phase-2 row.
    pub async fn begin(&self, project_id: &str) -> Result<StateTx<'_>, DatabaseError> {
        let (gate, tx) = self.write_tx().await?;
        StateTx::open(gate, tx, project_id).await
    }

    /// Take the write gate and open an immediate transaction that does not
    /// touch the phase-2 row.
    pub(crate) async fn write_tx(
        &self,
    ) -> Result<(tokio::sync::MutexGuard<'_, ()>, libsql::Transaction), DatabaseError> {
        let gate = self.db.write_gate.lock().await;
        let tx = self
            .db
            .conn()
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .await?;
        Ok((gate, tx))
    }

    /// Apply a pure transition to the latest snapshot and persist the result.
    ///
    /// # Errors
    ///
    /// Returns the transition's error (nothing is written), or a
    /// `DatabaseError` converted into `E` if the read or write fails.
    pub async fn update_state<E, F>(
        &self,
        project_id: &str,
        transition: F,
    ) -> Result<sift_core::entities::Phase2State, E>
    where
        E: From<DatabaseError>,
        F: FnOnce(sift_core::entities::Phase2State) -> Result<sift_core::entities::Phase2State, E>,
    {
        let tx = self.begin(project_id).await?;
        let next = transition(tx.state().clone())?;
        Ok(tx.commit(next).await?)
    }
}
