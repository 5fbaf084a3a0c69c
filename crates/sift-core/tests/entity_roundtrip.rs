//! Serde roundtrip and JsonSchema validation tests for persisted types.

use std::collections::{BTreeMap, BTreeSet};

use chrono::Utc;
use schemars::schema_for;
use sift_core::entities::*;
use sift_core::enums::*;
use sift_core::keys::{DedupKey, SubquestionKey};
use sift_core::responses::*;

/// Validate a JSON value against a schemars-generated schema.
fn validate_against_schema(
    schema: &serde_json::Value,
    instance: &serde_json::Value,
) -> Vec<String> {
    let validator = jsonschema::validator_for(schema).expect("schema should be valid");
    validator
        .iter_errors(instance)
        .map(|e| format!("{e}"))
        .collect()
}

macro_rules! roundtrip_and_validate {
    ($name:ident, $ty:ty, $instance:expr) => {
        #[test]
        fn $name() {
            let val: $ty = $instance;

            // Serde roundtrip
            let json_str = serde_json::to_string_pretty(&val).unwrap();
            let recovered: $ty = serde_json::from_str(&json_str).unwrap();
            assert_eq!(
                recovered,
                val,
                "serde roundtrip failed for {}",
                stringify!($ty)
            );

            // Schema validation
            let schema = serde_json::to_value(schema_for!($ty)).unwrap();
            let instance = serde_json::to_value(&val).unwrap();
            let errors = validate_against_schema(&schema, &instance);
            assert!(
                errors.is_empty(),
                "Schema validation failed for {}: {:?}",
                stringify!($ty),
                errors
            );
        }
    };
}

fn record() -> ExternalRecord {
    ExternalRecord {
        external_id: "38012345".into(),
        source: SourceId::PubMed,
        title: "Gamification in undergraduate nursing education".into(),
        authors: vec!["A. Rivera".into(), "L. Chen".into()],
        year: Some(2022),
        abstract_text: "We evaluated a gamified curriculum.".into(),
        doi: Some("10.1000/nurse.2022.1".into()),
        url: "https://pubmed.ncbi.nlm.nih.gov/38012345/".into(),
        is_open_access: true,
        citation_count: Some(14),
    }
}

fn strategy() -> Strategy {
    Strategy {
        question: "Does gamification improve engagement in nursing students?".into(),
        concept_matrix: vec![ConceptTerm {
            component: PicoComponent::Intervention,
            concept: "Gamification".into(),
            terms: vec!["gamification".into(), "serious games".into()],
        }],
        subquestion_blocks: vec![SubquestionBlock {
            key: SubquestionKey::normalize("Effect on engagement"),
            subquestion: "Effect on engagement".into(),
            keywords: vec!["gamification".into(), "engagement".into()],
            per_source_query: vec![SourceQuery {
                source: "PubMed".into(),
                query: "gamification[tiab] AND engagement[tiab]".into(),
                filters: Some("2015-2024".into()),
                estimated_results: None,
            }],
        }],
        recommendations: vec!["Include grey literature".into()],
    }
}

fn log() -> SubquestionLog {
    SubquestionLog {
        subquestion_key: SubquestionKey::normalize("Effect on engagement"),
        subquestion: "Effect on engagement".into(),
        last_search_at: Some(Utc::now()),
        saved_at: None,
        sources_used: vec![SourceId::PubMed, SourceId::CrossRef],
        year_filter: YearRange {
            from: 2015,
            to: 2024,
        },
        hide_missing_year: true,
        enforce_year_range: true,
        keywords_used: vec!["gamification".into()],
        queries_used: vec![ResolvedQuery {
            source: SourceId::PubMed,
            query: "gamification".into(),
        }],
        failed_sources: vec![SourceId::CrossRef],
        total_results: 3,
        saved_count: 0,
        save_batch: None,
    }
}

roundtrip_and_validate!(record_roundtrip, ExternalRecord, record());

roundtrip_and_validate!(
    record_without_doi_roundtrip,
    ExternalRecord,
    ExternalRecord {
        doi: None,
        year: None,
        citation_count: None,
        ..record()
    }
);

roundtrip_and_validate!(
    candidate_roundtrip,
    Candidate,
    Candidate {
        dedup_key: DedupKey::derive(Some("10.1000/nurse.2022.1"), "", None).unwrap(),
        record: record(),
        project_id: "proj-1".into(),
        subquestion_key: Some(SubquestionKey::normalize("Effect on engagement")),
        saved_at: Utc::now(),
        screening_status: ScreeningStatus::Pending,
    }
);

roundtrip_and_validate!(strategy_roundtrip, Strategy, strategy());

roundtrip_and_validate!(log_roundtrip, SubquestionLog, log());

roundtrip_and_validate!(
    protocol_roundtrip,
    Protocol,
    Protocol {
        project_name: "Gamified nursing".into(),
        main_question: "Does gamification improve engagement?".into(),
        subquestions: vec!["Effect on engagement".into()],
        pico: Pico {
            population: "Nursing students".into(),
            intervention: "Gamification".into(),
            comparison: "Traditional lectures".into(),
            outcome: "Engagement".into(),
        },
    }
);

roundtrip_and_validate!(
    phase2_state_roundtrip,
    Phase2State,
    Phase2State {
        strategy: Some(strategy()),
        hidden_subquestion_keys: BTreeSet::new(),
        locked_subquestion_keys: BTreeSet::from([SubquestionKey::normalize(
            "Effect on engagement"
        )]),
        searched_subquestion_keys: BTreeSet::from([SubquestionKey::normalize(
            "Effect on engagement"
        )]),
        selected_sources: vec![SourceId::PubMed, SourceId::EuropePmc],
        filters: ResultFilters::default(),
        logs: BTreeMap::from([(SubquestionKey::normalize("Effect on engagement"), log())]),
        last_search: Some(LastSearch {
            at: Utc::now(),
            subquestion_key: SubquestionKey::normalize("Effect on engagement"),
            result_count: 3,
        }),
        documentation_text: None,
        documentation_generated_at: None,
        revision: 7,
    }
);

roundtrip_and_validate!(
    prisma_roundtrip,
    PrismaCounts,
    PrismaCounts {
        identified: 12,
        duplicates: 3,
        without_abstract: 1,
    }
);

roundtrip_and_validate!(
    search_outcome_roundtrip,
    SearchOutcome,
    SearchOutcome {
        subquestion_key: SubquestionKey::normalize("Effect on engagement"),
        records: vec![record()],
        log: log(),
        source_reports: vec![SourceReport {
            source: SourceId::CrossRef,
            query: "gamification".into(),
            status: SourceStatus::TimedOut,
            record_count: 0,
            error: Some("timed out after 20s".into()),
        }],
        status_message: "1 results for Effect on engagement".into(),
    }
);

roundtrip_and_validate!(
    save_outcome_roundtrip,
    SaveOutcome,
    SaveOutcome {
        subquestion_key: SubquestionKey::normalize("Effect on engagement"),
        counts: SaveCounts {
            saved_count: 2,
            duplicate_count: 1,
            rejected_count: 0,
        },
        replayed: false,
        all_done: true,
    }
);

#[test]
fn empty_state_blob_deserializes_with_defaults() {
    let state: Phase2State = serde_json::from_str("{}").unwrap();
    assert!(state.strategy.is_none());
    assert_eq!(state.selected_sources, Vec::<SourceId>::new());
    assert!(state.filters.enforce_year_range);
    assert!(!state.filters.hide_missing_year);
    assert_eq!(state.filters.year_range.from, DEFAULT_YEAR_FROM);
    assert_eq!(state.revision, 0);
}

#[test]
fn record_abstract_uses_plain_field_name() {
    let json = serde_json::to_value(record()).unwrap();
    assert!(json.get("abstract").is_some());
    assert!(json.get("abstract_text").is_none());
}
