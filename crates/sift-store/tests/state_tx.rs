//! Atomicity of the phase-2 unit of work: candidates, PRISMA counters, and
//! the next snapshot land together or not at all.

use chrono::Utc;
use pretty_assertions::assert_eq;
use sift_core::entities::{ExternalRecord, Phase2State, Protocol};
use sift_core::enums::SourceId;
use sift_core::keys::SubquestionKey;
use sift_store::StoreService;

fn record(id: &str, doi: &str) -> ExternalRecord {
    ExternalRecord {
        external_id: id.into(),
        source: SourceId::CrossRef,
        title: format!("Record {id}"),
        authors: vec![],
        year: Some(2020),
        abstract_text: "Abstract.".into(),
        doi: Some(doi.into()),
        url: String::new(),
        is_open_access: false,
        citation_count: None,
    }
}

async fn setup() -> (StoreService, String) {
    let svc = StoreService::new_local(":memory:").await.unwrap();
    let project = svc
        .create_project("Review", &Protocol::default(), &Phase2State::default())
        .await
        .unwrap();
    (svc, project.id)
}

#[tokio::test]
async fn save_and_lock_commit_together() {
    let (svc, project_id) = setup().await;
    let key = SubquestionKey::normalize("A");

    let tx = svc.begin(&project_id).await.unwrap();
    let counts = tx
        .save_candidates(&key, &[record("1", "10.1/one")], Utc::now())
        .await
        .unwrap();
    let mut next = tx.state().clone();
    next.locked_subquestion_keys.insert(key.clone());
    let committed = tx.commit(next).await.unwrap();

    assert_eq!(counts.saved_count, 1);
    assert_eq!(committed.revision, 1);
    let state = svc.get_state(&project_id).await.unwrap();
    assert!(state.is_locked(&key));
    assert_eq!(svc.list_candidates(&project_id, None).await.unwrap().len(), 1);
    assert_eq!(svc.prisma(&project_id).await.unwrap().identified, 1);
}

#[tokio::test]
async fn abandoned_save_leaves_no_trace() {
    let (svc, project_id) = setup().await;
    let key = SubquestionKey::normalize("A");

    {
        let tx = svc.begin(&project_id).await.unwrap();
        tx.save_candidates(&key, &[record("1", "10.1/one")], Utc::now())
            .await
            .unwrap();
        tx.rollback().await.unwrap();
    }

    let state = svc.get_state(&project_id).await.unwrap();
    assert!(!state.is_locked(&key));
    assert_eq!(state.revision, 0);
    assert!(svc.list_candidates(&project_id, None).await.unwrap().is_empty());
    assert_eq!(svc.prisma(&project_id).await.unwrap().identified, 0);
}

#[tokio::test]
async fn dropped_transaction_discards_staged_candidates() {
    let (svc, project_id) = setup().await;
    let key = SubquestionKey::normalize("A");

    {
        let tx = svc.begin(&project_id).await.unwrap();
        let counts = tx
            .save_candidates(&key, &[record("1", "10.1/one"), record("2", "10.1/two")], Utc::now())
            .await
            .unwrap();
        assert_eq!(counts.saved_count, 2);
    }

    assert!(svc.list_candidates(&project_id, None).await.unwrap().is_empty());
    assert_eq!(svc.prisma(&project_id).await.unwrap().identified, 0);
    assert_eq!(svc.get_state(&project_id).await.unwrap().revision, 0);
}

#[tokio::test]
async fn sequential_writers_see_latest_snapshot() {
    let (svc, project_id) = setup().await;
    for source in [SourceId::PubMed, SourceId::EuropePmc] {
        svc.update_state::<sift_store::error::DatabaseError, _>(&project_id, |mut state| {
            state.selected_sources.push(source);
            Ok(state)
        })
        .await
        .unwrap();
    }
    let state = svc.get_state(&project_id).await.unwrap();
    assert_eq!(state.revision, 2);
    assert_eq!(
        state.selected_sources,
        vec![
            SourceId::SemanticScholar,
            SourceId::PubMed,
            SourceId::CrossRef,
            SourceId::EuropePmc,
            SourceId::PubMed,
            SourceId::EuropePmc
        ]
    );
}
