//! The latest search result set per project.

use sift_core::entities::ResultSet;
use sift_core::keys::SubquestionKey;

use crate::error::DatabaseError;
use crate::helpers::{parse_datetime, parse_json, to_json};
use crate::service::StoreService;

/// Replace the project's result set inside the caller's transaction.
pub(crate) async fn put(
    conn: &libsql::Connection,
    project_id: &str,
    set: &ResultSet,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO result_sets (project_id, subquestion_key, records_json, source_reports_json, searched_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(project_id) DO UPDATE SET
             subquestion_key = excluded.subquestion_key,
             records_json = excluded.records_json,
             source_reports_json = excluded.source_reports_json,
             searched_at = excluded.searched_at",
        libsql::params![
            project_id,
            set.subquestion_key.as_str(),
            to_json(&set.records)?,
            to_json(&set.source_reports)?,
            set.searched_at.to_rfc3339()
        ],
    )
    .await?;
    Ok(())
}

/// Read the project's result set on the given connection or transaction.
pub(crate) async fn load(
    conn: &libsql::Connection,
    project_id: &str,
) -> Result<Option<ResultSet>, DatabaseError> {
    let mut rows = conn
        .query(
            "SELECT subquestion_key, records_json, source_reports_json, searched_at
             FROM result_sets WHERE project_id = ?1",
            [project_id],
        )
        .await?;
    let Some(row) = rows.next().await? else {
        return Ok(None);
    };
    Ok(Some(ResultSet {
        subquestion_key: SubquestionKey::normalize(&row.get::<String>(0)?),
        records: parse_json(&row.get::<String>(1)?, "records_json")?,
        source_reports: parse_json(&row.get::<String>(2)?, "source_reports_json")?,
        searched_at: parse_datetime(&row.get::<String>(3)?)?,
    }))
}

impl StoreService {
    /// The most recent search's filtered records, if any search ran.
    pub async fn current_result_set(
        &self,
        project_id: &str,
    ) -> Result<Option<ResultSet>, DatabaseError> {
        load(self.db().conn(), project_id).await
    }
}
