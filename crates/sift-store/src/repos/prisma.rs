//! PRISMA flow counters.

use sift_core::entities::PrismaCounts;
use sift_core::responses::SaveCounts;

use crate::error::DatabaseError;
use crate::helpers::to_u64;
use crate::service::StoreService;

/// Add one batch's counts inside the caller's transaction.
pub(crate) async fn bump(
    conn: &libsql::Connection,
    project_id: &str,
    counts: &SaveCounts,
) -> Result<(), DatabaseError> {
    let identified = i64::from(counts.saved_count) + i64::from(counts.duplicate_count);
    conn.execute(
        "INSERT INTO prisma_counts (project_id, identified, duplicates, without_abstract)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(project_id) DO UPDATE SET
             identified = identified + excluded.identified,
             duplicates = duplicates + excluded.duplicates,
             without_abstract = without_abstract + excluded.without_abstract",
        libsql::params![
            project_id,
            identified,
            i64::from(counts.duplicate_count),
            i64::from(counts.rejected_count)
        ],
    )
    .await?;
    Ok(())
}

impl StoreService {
    pub async fn prisma(&self, project_id: &str) -> Result<PrismaCounts, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT identified, duplicates, without_abstract FROM prisma_counts WHERE project_id = ?1",
                [project_id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(PrismaCounts {
                identified: to_u64(row.get::<i64>(0)?),
                duplicates: to_u64(row.get::<i64>(1)?),
                without_abstract: to_u64(row.get::<i64>(2)?),
            }),
            None => Ok(PrismaCounts::default()),
        }
    }
}
