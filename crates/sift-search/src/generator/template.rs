//! Offline term generator that derives the strategy from the protocol's
//! PICO fields.
//!
//! Each non-blank PICO field becomes one concept; its synonyms are the field
//! itself plus any comma-, semicolon-, or slash-separated parts. Every
//! sub-question gets the same boolean query: synonyms `OR`-ed within a
//! concept, concepts `AND`-ed together.

use sift_core::entities::{ConceptTerm, Protocol, SourceQuery};
use sift_core::enums::{PicoComponent, SourceId};

use super::{
    BlocksRequest, GeneratedBlock, GeneratedBlocks, GeneratedMatrix, GeneratorError,
    MatrixRequest, TermGenerator,
};

const RECOMMENDATIONS: [&str; 3] = [
    "Review the synonyms for each concept and add controlled-vocabulary terms (MeSH, Emtree).",
    "Run each query in the source's own interface to check the expected result volume.",
    "Record any manual adjustments so the search can be reproduced.",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateTermGenerator;

impl TemplateTermGenerator {
    fn matrix(protocol: &Protocol) -> Vec<ConceptTerm> {
        let pico = &protocol.pico;
        PicoComponent::ALL
            .into_iter()
            .zip([
                &pico.population,
                &pico.intervention,
                &pico.comparison,
                &pico.outcome,
            ])
            .filter(|(_, field)| !field.trim().is_empty())
            .map(|(component, field)| ConceptTerm {
                component,
                concept: field.trim().to_string(),
                terms: synonyms(field),
            })
            .collect()
    }
}

fn synonyms(field: &str) -> Vec<String> {
    let mut terms = vec![field.trim().to_string()];
    if field.contains([',', ';', '/']) {
        terms.extend(
            field
                .split([',', ';', '/'])
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(String::from),
        );
    }
    terms
}

fn quote(term: &str) -> String {
    if term.contains(char::is_whitespace) {
        format!("\"{term}\"")
    } else {
        term.to_string()
    }
}

/// `(a OR "b c") AND (d)` over the matrix.
fn boolean_query(matrix: &[ConceptTerm]) -> String {
    matrix
        .iter()
        .filter(|concept| !concept.terms.is_empty())
        .map(|concept| {
            let terms = concept
                .terms
                .iter()
                .map(|term| quote(term))
                .collect::<Vec<_>>()
                .join(" OR ");
            format!("({terms})")
        })
        .collect::<Vec<_>>()
        .join(" AND ")
}

fn recommendations() -> Vec<String> {
    RECOMMENDATIONS.iter().map(ToString::to_string).collect()
}

fn question(protocol: &Protocol) -> Option<String> {
    let question = protocol.main_question.trim();
    (!question.is_empty()).then(|| question.to_string())
}

impl TermGenerator for TemplateTermGenerator {
    async fn concept_matrix(&self, request: &MatrixRequest) -> Result<GeneratedMatrix, GeneratorError> {
        let concepts = Self::matrix(&request.protocol);
        if concepts.is_empty() {
            return Err(GeneratorError::Empty("protocol has no PICO fields".into()));
        }
        Ok(GeneratedMatrix {
            question: question(&request.protocol),
            concepts,
            recommendations: recommendations(),
        })
    }

    async fn subquestion_blocks(
        &self,
        request: &BlocksRequest,
    ) -> Result<GeneratedBlocks, GeneratorError> {
        let query = boolean_query(&request.concept_matrix);
        let keywords: Vec<String> = request
            .concept_matrix
            .iter()
            .flat_map(|concept| concept.terms.iter().cloned())
            .collect();

        let mut subquestions = request.protocol.subquestions.clone();
        if subquestions.iter().all(|text| text.trim().is_empty()) {
            subquestions = vec![request.protocol.display_question().to_string()];
        }

        let blocks = subquestions
            .into_iter()
            .map(|subquestion| GeneratedBlock {
                subquestion,
                keywords: keywords.clone(),
                per_source_query: request
                    .sources
                    .iter()
                    .map(|source: &SourceId| SourceQuery {
                        source: source.label().to_string(),
                        query: query.clone(),
                        filters: None,
                        estimated_results: None,
                    })
                    .collect(),
            })
            .collect();

        Ok(GeneratedBlocks {
            question: question(&request.protocol),
            blocks,
            recommendations: recommendations(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sift_core::entities::Pico;

    fn protocol() -> Protocol {
        Protocol {
            project_name: "Gamified nursing".into(),
            main_question: "Does gamification improve engagement?".into(),
            subquestions: vec!["Effect on engagement".into()],
            pico: Pico {
                population: "Nursing students".into(),
                intervention: "Gamification; serious games".into(),
                comparison: " ".into(),
                outcome: "Engagement".into(),
            },
        }
    }

    #[tokio::test]
    async fn matrix_has_one_concept_per_filled_pico_field() {
        let matrix = TemplateTermGenerator
            .concept_matrix(&MatrixRequest { protocol: protocol() })
            .await
            .unwrap();
        let components: Vec<_> = matrix.concepts.iter().map(|c| c.component).collect();
        assert_eq!(
            components,
            vec![
                PicoComponent::Population,
                PicoComponent::Intervention,
                PicoComponent::Outcome
            ]
        );
        assert_eq!(
            matrix.concepts[1].terms,
            vec!["Gamification; serious games", "Gamification", "serious games"]
        );
        assert_eq!(matrix.question.as_deref(), Some("Does gamification improve engagement?"));
    }

    #[tokio::test]
    async fn empty_pico_is_an_error() {
        let err = TemplateTermGenerator
            .concept_matrix(&MatrixRequest {
                protocol: Protocol::default(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, GeneratorError::Empty(_)));
    }

    #[tokio::test]
    async fn blocks_carry_one_query_per_source() {
        let matrix = vec![
            ConceptTerm {
                component: PicoComponent::Population,
                concept: "Nursing students".into(),
                terms: vec!["nursing students".into(), "nurses".into()],
            },
            ConceptTerm {
                component: PicoComponent::Intervention,
                concept: "Gamification".into(),
                terms: vec!["gamification".into()],
            },
        ];
        let blocks = TemplateTermGenerator
            .subquestion_blocks(&BlocksRequest {
                protocol: protocol(),
                concept_matrix: matrix,
                sources: vec![SourceId::PubMed, SourceId::CrossRef],
            })
            .await
            .unwrap();

        assert_eq!(blocks.blocks.len(), 1);
        let block = &blocks.blocks[0];
        assert_eq!(block.keywords, vec!["nursing students", "nurses", "gamification"]);
        assert_eq!(block.per_source_query.len(), 2);
        assert_eq!(block.per_source_query[1].source, "CrossRef");
        assert_eq!(
            block.per_source_query[0].query,
            "(\"nursing students\" OR nurses) AND (gamification)"
        );
    }

    #[tokio::test]
    async fn missing_subquestions_fall_back_to_main_question() {
        let mut protocol = protocol();
        protocol.subquestions.clear();
        let blocks = TemplateTermGenerator
            .subquestion_blocks(&BlocksRequest {
                protocol,
                concept_matrix: vec![],
                sources: vec![SourceId::PubMed],
            })
            .await
            .unwrap();
        assert_eq!(blocks.blocks[0].subquestion, "Does gamification improve engagement?");
    }
}
