//! Candidate repository: deduplicated persistence of selected records.
//!
//! A record is rejected when it has neither a usable title nor an abstract,
//! or when no dedup key can be derived (no DOI and no title). Accepted
//! records are inserted unless their dedup key is already present for the
//! project (including earlier in the same batch), in which case only
//! `saved_at` is refreshed. Counts feed the PRISMA counters in the same
//! transaction.

use chrono::{DateTime, Utc};
use sift_core::entities::{Candidate, ExternalRecord};
use sift_core::enums::ScreeningStatus;
use sift_core::keys::{DedupKey, SubquestionKey};
use sift_core::responses::SaveCounts;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime, parse_enum, parse_json, to_i64, to_json};
use crate::repos::prisma;
use crate::service::StoreService;

const SELECT_CANDIDATE: &str = "SELECT project_id, dedup_key, external_id, source, title, authors_json, year, abstract, doi, url, is_open_access, citation_count, subquestion_key, screening_status, saved_at FROM candidates";

fn row_to_candidate(row: &libsql::Row) -> Result<Candidate, DatabaseError> {
    Ok(Candidate {
        project_id: row.get::<String>(0)?,
        dedup_key: DedupKey::from_stored(row.get::<String>(1)?),
        record: ExternalRecord {
            external_id: row.get::<String>(2)?,
            source: parse_enum(&row.get::<String>(3)?)?,
            title: row.get::<String>(4)?,
            authors: parse_json(&row.get::<String>(5)?, "authors_json")?,
            year: row
                .get::<Option<i64>>(6)?
                .and_then(|year| i32::try_from(year).ok()),
            abstract_text: row.get::<String>(7)?,
            doi: get_opt_string(row, 8)?,
            url: row.get::<String>(9)?,
            is_open_access: row.get::<i64>(10)? != 0,
            citation_count: row
                .get::<Option<i64>>(11)?
                .and_then(|count| u64::try_from(count).ok()),
        },
        subquestion_key: get_opt_string(row, 12)?.map(|key| SubquestionKey::normalize(&key)),
        screening_status: parse_enum(&row.get::<String>(13)?)?,
        saved_at: parse_datetime(&row.get::<String>(14)?)?,
    })
}

/// Why a record cannot become a candidate, if it cannot.
fn rejection(record: &ExternalRecord) -> Option<&'static str> {
    if !record.has_usable_title() && !record.has_abstract() {
        return Some("no title and no abstract");
    }
    if record.dedup_key().is_none() {
        return Some("no DOI and no title");
    }
    None
}

/// Persist one batch inside the caller's transaction.
pub(crate) async fn save_batch(
    conn: &libsql::Connection,
    project_id: &str,
    subquestion_key: &SubquestionKey,
    records: &[ExternalRecord],
    now: DateTime<Utc>,
) -> Result<SaveCounts, DatabaseError> {
    let mut counts = SaveCounts::default();
    let saved_at = now.to_rfc3339();

    for record in records {
        let dedup_key = match (rejection(record), record.dedup_key()) {
            (None, Some(key)) => key,
            (reason, _) => {
                tracing::debug!(
                    external_id = %record.external_id,
                    reason = reason.unwrap_or("no identity"),
                    "candidate rejected"
                );
                counts.rejected_count += 1;
                continue;
            }
        };

        let inserted = conn
            .execute(
                "INSERT OR IGNORE INTO candidates (project_id, dedup_key, external_id, source, title, authors_json, year, abstract, doi, url, is_open_access, citation_count, subquestion_key, screening_status, saved_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
                libsql::params![
                    project_id,
                    dedup_key.as_str(),
                    record.external_id.as_str(),
                    record.source.as_str(),
                    record.title.trim(),
                    to_json(&record.authors)?,
                    record.year.map(i64::from),
                    record.abstract_text.as_str(),
                    record.doi.as_deref(),
                    record.url.as_str(),
                    i64::from(record.is_open_access),
                    record.citation_count.map(to_i64),
                    subquestion_key.as_str(),
                    ScreeningStatus::Pending.as_str(),
                    saved_at.as_str()
                ],
            )
            .await?;

        if inserted == 0 {
            conn.execute(
                "UPDATE candidates SET saved_at = ?1 WHERE project_id = ?2 AND dedup_key = ?3",
                libsql::params![saved_at.as_str(), project_id, dedup_key.as_str()],
            )
            .await?;
            counts.duplicate_count += 1;
        } else {
            counts.saved_count += 1;
        }
    }

    prisma::bump(conn, project_id, &counts).await?;
    tracing::info!(
        project_id,
        subquestion = %subquestion_key,
        saved = counts.saved_count,
        duplicates = counts.duplicate_count,
        rejected = counts.rejected_count,
        "candidate batch saved"
    );
    Ok(counts)
}

impl StoreService {
    pub async fn get_candidate(
        &self,
        project_id: &str,
        dedup_key: &str,
    ) -> Result<Candidate, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("{SELECT_CANDIDATE} WHERE project_id = ?1 AND dedup_key = ?2"),
                [project_id, dedup_key],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_candidate(&row)
    }

    /// Candidates of a project in save order, optionally filtered by status.
    pub async fn list_candidates(
        &self,
        project_id: &str,
        status: Option<ScreeningStatus>,
    ) -> Result<Vec<Candidate>, DatabaseError> {
        let mut rows = match status {
            Some(status) => {
                self.db()
                    .conn()
                    .query(
                        &format!(
                            "{SELECT_CANDIDATE} WHERE project_id = ?1 AND screening_status = ?2 ORDER BY rowid"
                        ),
                        [project_id, status.as_str()],
                    )
                    .await?
            }
            None => {
                self.db()
                    .conn()
                    .query(
                        &format!("{SELECT_CANDIDATE} WHERE project_id = ?1 ORDER BY rowid"),
                        [project_id],
                    )
                    .await?
            }
        };
        let mut candidates = Vec::new();
        while let Some(row) = rows.next().await? {
            candidates.push(row_to_candidate(&row)?);
        }
        Ok(candidates)
    }

    /// Record a screening decision.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` for a transition the screening
    /// lifecycle does not allow, `DatabaseError::NoResult` for an unknown key.
    pub async fn set_screening_status(
        &self,
        project_id: &str,
        dedup_key: &str,
        next: ScreeningStatus,
    ) -> Result<Candidate, DatabaseError> {
        let current = self.get_candidate(project_id, dedup_key).await?;
        if !current.screening_status.can_transition_to(next) {
            return Err(DatabaseError::InvalidState(format!(
                "candidate {dedup_key} cannot move from {} to {next}",
                current.screening_status
            )));
        }
        self.db()
            .conn()
            .execute(
                "UPDATE candidates SET screening_status = ?1 WHERE project_id = ?2 AND dedup_key = ?3",
                [next.as_str(), project_id, dedup_key],
            )
            .await?;
        Ok(Candidate {
            screening_status: next,
            ..current
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use chrono::Utc;
    use sift_core::entities::ExternalRecord;
    use sift_core::enums::{ScreeningStatus, SourceId};
    use sift_core::keys::SubquestionKey;
    use sift_core::responses::SaveCounts;

    use crate::StoreService;
    use crate::error::DatabaseError;
    use crate::test_support::helpers::{record, test_project};

    fn key() -> SubquestionKey {
        SubquestionKey::normalize("Effect on engagement")
    }

    async fn save(svc: &StoreService, project_id: &str, records: &[ExternalRecord]) -> SaveCounts {
        let tx = svc.begin(project_id).await.unwrap();
        let counts = tx.save_candidates(&key(), records, Utc::now()).await.unwrap();
        let next = tx.state().clone();
        tx.commit(next).await.unwrap();
        counts
    }

    #[tokio::test]
    async fn saves_new_records_as_pending() {
        let (svc, project_id) = test_project().await;
        let counts = save(&svc, &project_id, &[record("1", Some("10.1/a"), "Alpha")]).await;
        assert_eq!(
            counts,
            SaveCounts {
                saved_count: 1,
                duplicate_count: 0,
                rejected_count: 0
            }
        );

        let candidates = svc.list_candidates(&project_id, None).await.unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].dedup_key.as_str(), "doi:10.1/a");
        assert_eq!(candidates[0].screening_status, ScreeningStatus::Pending);
        assert_eq!(candidates[0].subquestion_key, Some(key()));
        assert_eq!(candidates[0].record.source, SourceId::PubMed);
    }

    #[tokio::test]
    async fn resaving_is_idempotent_for_storage() {
        let (svc, project_id) = test_project().await;
        let batch = [record("1", Some("10.1/a"), "Alpha"), record("2", None, "Beta")];
        save(&svc, &project_id, &batch).await;
        let first_saved_at = svc
            .get_candidate(&project_id, "doi:10.1/a")
            .await
            .unwrap()
            .saved_at;

        let counts = save(&svc, &project_id, &batch).await;
        assert_eq!(counts.saved_count, 0);
        assert_eq!(counts.duplicate_count, 2);
        assert_eq!(svc.list_candidates(&project_id, None).await.unwrap().len(), 2);

        let refreshed = svc.get_candidate(&project_id, "doi:10.1/a").await.unwrap();
        assert!(refreshed.saved_at >= first_saved_at);
    }

    #[tokio::test]
    async fn duplicates_within_batch_are_counted() {
        let (svc, project_id) = test_project().await;
        let batch = [
            record("1", Some("10.1/A"), "Alpha"),
            record("2", Some("https://doi.org/10.1/a"), "Alpha (preprint)"),
        ];
        let counts = save(&svc, &project_id, &batch).await;
        assert_eq!(counts.saved_count, 1);
        assert_eq!(counts.duplicate_count, 1);
    }

    #[tokio::test]
    async fn rejects_records_without_identity_or_text() {
        let (svc, project_id) = test_project().await;
        let mut no_text = record("1", Some("10.1/a"), "");
        no_text.abstract_text.clear();
        let mut no_identity = record("2", None, "");
        no_identity.abstract_text = "An abstract only".into();

        let counts = save(&svc, &project_id, &[no_text, no_identity]).await;
        assert_eq!(counts.rejected_count, 2);
        assert_eq!(counts.saved_count, 0);

        let prisma = svc.prisma(&project_id).await.unwrap();
        assert_eq!(prisma.without_abstract, 2);
        assert_eq!(prisma.identified, 0);
    }

    #[tokio::test]
    async fn prisma_counters_accumulate() {
        let (svc, project_id) = test_project().await;
        save(&svc, &project_id, &[record("1", Some("10.1/a"), "Alpha")]).await;
        save(
            &svc,
            &project_id,
            &[record("1", Some("10.1/a"), "Alpha"), record("3", None, "Gamma")],
        )
        .await;

        let prisma = svc.prisma(&project_id).await.unwrap();
        assert_eq!(prisma.identified, 3);
        assert_eq!(prisma.duplicates, 1);
    }

    #[tokio::test]
    async fn screening_status_follows_lifecycle() {
        let (svc, project_id) = test_project().await;
        save(&svc, &project_id, &[record("1", Some("10.1/a"), "Alpha")]).await;

        let included = svc
            .set_screening_status(&project_id, "doi:10.1/a", ScreeningStatus::Included)
            .await
            .unwrap();
        assert_eq!(included.screening_status, ScreeningStatus::Included);
        assert_eq!(
            svc.list_candidates(&project_id, Some(ScreeningStatus::Included))
                .await
                .unwrap()
                .len(),
            1
        );

        let err = svc
            .set_screening_status(&project_id, "doi:10.1/a", ScreeningStatus::Excluded)
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidState(_)));
    }
}
