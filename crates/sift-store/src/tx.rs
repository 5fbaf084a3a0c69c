//! Unit of work over one project's phase-2 aggregate.

use chrono::{DateTime, Utc};
use sift_core::entities::{ExternalRecord, Phase2State, ResultSet};
use sift_core::keys::SubquestionKey;
use sift_core::responses::SaveCounts;

use crate::error::DatabaseError;
use crate::helpers::{parse_json, to_i64, to_json, to_u64};
use crate::repos::{candidate, result_set};

/// An open immediate transaction holding the latest phase-2 snapshot.
///
/// Staged writes (candidates, PRISMA counters, result set) and the next
/// snapshot land atomically on [`StateTx::commit`]; dropping the value
/// without committing discards all of them.
pub struct StateTx<'a> {
    _gate: tokio::sync::MutexGuard<'a, ()>,
    tx: libsql::Transaction,
    project_id: String,
    state: Phase2State,
}

impl<'a> StateTx<'a> {
    pub(crate) async fn open(
        gate: tokio::sync::MutexGuard<'a, ()>,
        tx: libsql::Transaction,
        project_id: &str,
    ) -> Result<Self, DatabaseError> {
        let mut rows = tx
            .query(
                "SELECT state_json, revision FROM phase2_state WHERE project_id = ?1",
                [project_id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        let mut state: Phase2State = parse_json(&row.get::<String>(0)?, "state_json")?;
        state.revision = to_u64(row.get::<i64>(1)?);
        drop(rows);

        Ok(Self {
            _gate: gate,
            tx,
            project_id: project_id.to_string(),
            state,
        })
    }

    /// The snapshot read at the start of the transaction.
    #[must_use]
    pub const fn state(&self) -> &Phase2State {
        &self.state
    }

    #[must_use]
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Stage a candidate batch (dedup + PRISMA counters) in this transaction.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if any insert or update fails.
    pub async fn save_candidates(
        &self,
        subquestion_key: &SubquestionKey,
        records: &[ExternalRecord],
        now: DateTime<Utc>,
    ) -> Result<SaveCounts, DatabaseError> {
        candidate::save_batch(&self.tx, &self.project_id, subquestion_key, records, now).await
    }

    /// The result set as seen by this transaction.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the read or decode fails.
    pub async fn result_set(&self) -> Result<Option<ResultSet>, DatabaseError> {
        result_set::load(&self.tx, &self.project_id).await
    }

    /// Stage the latest result set in this transaction.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the upsert fails.
    pub async fn put_result_set(&self, set: &ResultSet) -> Result<(), DatabaseError> {
        result_set::put(&self.tx, &self.project_id, set).await
    }

    /// Write `next` as the new snapshot (revision + 1) and commit.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::StaleRevision` if the row moved since it was
    /// read, or any write/commit failure. Nothing is persisted on error.
    pub async fn commit(self, mut next: Phase2State) -> Result<Phase2State, DatabaseError> {
        let expected = self.state.revision;
        next.revision = expected + 1;
        let now = Utc::now();

        let changed = self
            .tx
            .execute(
                "UPDATE phase2_state SET state_json = ?1, revision = ?2, updated_at = ?3
                 WHERE project_id = ?4 AND revision = ?5",
                libsql::params![
                    to_json(&next)?,
                    to_i64(next.revision),
                    now.to_rfc3339(),
                    self.project_id.as_str(),
                    to_i64(expected)
                ],
            )
            .await?;
        if changed == 0 {
            return Err(DatabaseError::StaleRevision {
                project_id: self.project_id,
                expected,
            });
        }

        self.tx.commit().await?;
        tracing::debug!(project_id = %self.project_id, revision = next.revision, "phase-2 state committed");
        Ok(next)
    }

    /// Discard staged writes explicitly.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the rollback fails.
    pub async fn rollback(self) -> Result<(), DatabaseError> {
        self.tx.rollback().await?;
        Ok(())
    }
}
