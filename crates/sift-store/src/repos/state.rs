//! Phase-2 aggregate reads. Writes go through [`crate::StateTx`].

use sift_core::entities::Phase2State;

use crate::error::DatabaseError;
use crate::helpers::{parse_json, to_u64};
use crate::service::StoreService;

impl StoreService {
    /// Latest persisted snapshot, with `revision` taken from the row.
    pub async fn get_state(&self, project_id: &str) -> Result<Phase2State, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT state_json, revision FROM phase2_state WHERE project_id = ?1",
                [project_id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        let mut state: Phase2State = parse_json(&row.get::<String>(0)?, "state_json")?;
        state.revision = to_u64(row.get::<i64>(1)?);
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use sift_core::enums::SourceId;

    use crate::error::DatabaseError;
    use crate::test_support::helpers::test_project;

    #[tokio::test]
    async fn update_state_bumps_revision() {
        let (svc, project_id) = test_project().await;
        let next = svc
            .update_state::<DatabaseError, _>(&project_id, |mut state| {
                state.selected_sources = vec![SourceId::PubMed];
                Ok(state)
            })
            .await
            .unwrap();
        assert_eq!(next.revision, 1);

        let stored = svc.get_state(&project_id).await.unwrap();
        assert_eq!(stored.revision, 1);
        assert_eq!(stored.selected_sources, vec![SourceId::PubMed]);
    }

    #[tokio::test]
    async fn failed_transition_writes_nothing() {
        let (svc, project_id) = test_project().await;
        let result = svc
            .update_state(&project_id, |_state| {
                Err(DatabaseError::InvalidState("rejected".into()))
            })
            .await;
        assert!(result.is_err());
        assert_eq!(svc.get_state(&project_id).await.unwrap().revision, 0);
    }

    #[tokio::test]
    async fn dropped_transaction_rolls_back() {
        let (svc, project_id) = test_project().await;
        {
            let tx = svc.begin(&project_id).await.unwrap();
            assert_eq!(tx.state().revision, 0);
        }
        let next = svc
            .update_state::<DatabaseError, _>(&project_id, Ok)
            .await
            .unwrap();
        assert_eq!(next.revision, 1);
    }

    #[tokio::test]
    async fn missing_project_has_no_state() {
        let (svc, _) = test_project().await;
        assert!(matches!(
            svc.get_state("prj-missing").await,
            Err(DatabaseError::NoResult)
        ));
        assert!(matches!(
            svc.begin("prj-missing").await,
            Err(DatabaseError::NoResult)
        ));
    }
}
