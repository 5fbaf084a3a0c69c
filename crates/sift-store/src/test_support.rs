//! Shared test utilities for sift-store tests.

pub(crate) mod helpers {
    use sift_core::entities::{ExternalRecord, Phase2State, Pico, Protocol};
    use sift_core::enums::SourceId;

    use crate::service::StoreService;

    /// In-memory store.
    pub async fn test_service() -> StoreService {
        StoreService::new_local(":memory:").await.unwrap()
    }

    /// In-memory store with one project and an empty aggregate.
    pub async fn test_project() -> (StoreService, String) {
        let svc = test_service().await;
        let project = svc
            .create_project("Test review", &sample_protocol(), &Phase2State::default())
            .await
            .unwrap();
        (svc, project.id)
    }

    pub fn sample_protocol() -> Protocol {
        Protocol {
            project_name: "Gamified nursing".into(),
            main_question: "Does gamification improve engagement in nursing students?".into(),
            subquestions: vec!["Effect on engagement".into()],
            pico: Pico {
                population: "Nursing students".into(),
                intervention: "Gamification".into(),
                comparison: "Traditional teaching".into(),
                outcome: "Engagement".into(),
            },
        }
    }

    /// A PubMed record with an abstract.
    pub fn record(id: &str, doi: Option<&str>, title: &str) -> ExternalRecord {
        ExternalRecord {
            external_id: id.into(),
            source: SourceId::PubMed,
            title: title.into(),
            authors: vec!["Rivera A".into()],
            year: Some(2021),
            abstract_text: "Abstract text.".into(),
            doi: doi.map(String::from),
            url: format!("https://pubmed.ncbi.nlm.nih.gov/{id}/"),
            is_open_access: false,
            citation_count: None,
        }
    }
}
