//! Normalization of raw generator output into strategy parts.
//!
//! Terms and keywords are trimmed and blanks dropped. Synonym lists are
//! deduplicated case-insensitively, keeping the first spelling seen. Blocks
//! whose normalized keys collide are folded into the first occurrence.

use std::collections::HashSet;

use sift_core::entities::{ConceptTerm, SourceQuery, SubquestionBlock};
use sift_core::keys::SubquestionKey;

use super::{GeneratedBlock, GeneratorError};

/// Trim, drop blanks, and dedup case-insensitively in first-seen order.
#[must_use]
pub fn shape_terms(terms: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    terms
        .into_iter()
        .map(|term| term.trim().to_string())
        .filter(|term| !term.is_empty())
        .filter(|term| seen.insert(term.to_lowercase()))
        .collect()
}

/// Trim keywords and drop blank ones.
#[must_use]
pub fn shape_keywords(keywords: Vec<String>) -> Vec<String> {
    keywords
        .into_iter()
        .map(|keyword| keyword.trim().to_string())
        .filter(|keyword| !keyword.is_empty())
        .collect()
}

/// Shape every concept's synonyms. Rows are kept even when their terms
/// shape away to nothing.
///
/// # Errors
///
/// Returns [`GeneratorError::Empty`] when no concept has any term left.
pub fn shape_matrix(concepts: Vec<ConceptTerm>) -> Result<Vec<ConceptTerm>, GeneratorError> {
    let shaped: Vec<ConceptTerm> = concepts
        .into_iter()
        .map(|concept| ConceptTerm {
            component: concept.component,
            concept: concept.concept.trim().to_string(),
            terms: shape_terms(concept.terms),
        })
        .collect();

    if shaped.iter().all(|concept| concept.terms.is_empty()) {
        return Err(GeneratorError::Empty("concept matrix has no terms".into()));
    }
    Ok(shaped)
}

/// Turn raw blocks into keyed sub-question blocks.
///
/// # Errors
///
/// Returns [`GeneratorError::Empty`] when the generator returned no blocks.
pub fn shape_blocks(blocks: Vec<GeneratedBlock>) -> Result<Vec<SubquestionBlock>, GeneratorError> {
    if blocks.is_empty() {
        return Err(GeneratorError::Empty("no sub-question blocks".into()));
    }

    let mut shaped: Vec<SubquestionBlock> = Vec::with_capacity(blocks.len());
    for raw in blocks {
        let key = SubquestionKey::normalize(&raw.subquestion);
        let keywords = shape_keywords(raw.keywords);
        let queries: Vec<SourceQuery> = raw
            .per_source_query
            .into_iter()
            .map(|entry| SourceQuery {
                source: entry.source.trim().to_string(),
                query: entry.query.trim().to_string(),
                ..entry
            })
            .collect();

        if let Some(first) = shaped.iter_mut().find(|block| block.key == key) {
            tracing::debug!(subquestion = %key, "merging duplicate sub-question block");
            merge_into(first, keywords, queries);
        } else {
            shaped.push(SubquestionBlock {
                subquestion: raw.subquestion.trim().to_string(),
                key,
                keywords,
                per_source_query: queries,
            });
        }
    }
    Ok(shaped)
}

/// First block wins its text; keywords are unioned and queries for sources
/// it does not cover yet are appended.
fn merge_into(first: &mut SubquestionBlock, keywords: Vec<String>, queries: Vec<SourceQuery>) {
    let mut combined = std::mem::take(&mut first.keywords);
    combined.extend(keywords);
    first.keywords = shape_terms(combined);

    for query in queries {
        let known = first
            .per_source_query
            .iter()
            .any(|existing| existing.source.eq_ignore_ascii_case(&query.source));
        if !known {
            first.per_source_query.push(query);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sift_core::enums::PicoComponent;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    fn query(source: &str, query: &str) -> SourceQuery {
        SourceQuery {
            source: source.into(),
            query: query.into(),
            filters: None,
            estimated_results: None,
        }
    }

    #[test]
    fn terms_are_trimmed_and_deduped_case_insensitively() {
        let shaped = shape_terms(strings(&[" Nurses ", "", "nurses", "Nursing staff", "  "]));
        assert_eq!(shaped, strings(&["Nurses", "Nursing staff"]));
    }

    #[test]
    fn concepts_without_terms_keep_their_row() {
        let matrix = vec![
            ConceptTerm {
                component: PicoComponent::Population,
                concept: " Nursing students ".into(),
                terms: strings(&["nursing students", "Nursing Students"]),
            },
            ConceptTerm {
                component: PicoComponent::Comparison,
                concept: "None".into(),
                terms: strings(&["  "]),
            },
        ];
        let shaped = shape_matrix(matrix).unwrap();
        assert_eq!(shaped.len(), 2);
        assert_eq!(shaped[0].concept, "Nursing students");
        assert_eq!(shaped[0].terms, strings(&["nursing students"]));
        assert_eq!(shaped[1].component, PicoComponent::Comparison);
        assert_eq!(shaped[1].concept, "None");
        assert!(shaped[1].terms.is_empty());
    }

    #[test]
    fn matrix_without_any_terms_is_empty() {
        let matrix = vec![
            ConceptTerm {
                component: PicoComponent::Outcome,
                concept: "Engagement".into(),
                terms: vec![],
            },
            ConceptTerm {
                component: PicoComponent::Comparison,
                concept: "None".into(),
                terms: strings(&[" ", ""]),
            },
        ];
        assert!(matches!(shape_matrix(matrix), Err(GeneratorError::Empty(_))));
        assert!(matches!(shape_matrix(vec![]), Err(GeneratorError::Empty(_))));
    }

    #[test]
    fn blocks_get_normalized_keys() {
        let blocks = shape_blocks(vec![
            GeneratedBlock {
                subquestion: "  Effect on engagement ".into(),
                keywords: strings(&["gamification", " "]),
                per_source_query: vec![],
            },
            GeneratedBlock::default(),
        ])
        .unwrap();
        assert_eq!(blocks[0].key.as_str(), "Effect on engagement");
        assert_eq!(blocks[0].keywords, strings(&["gamification"]));
        assert_eq!(blocks[1].key.as_str(), "Untitled subquestion");
    }

    #[test]
    fn colliding_keys_merge_into_first_block() {
        let blocks = shape_blocks(vec![
            GeneratedBlock {
                subquestion: "Effect on engagement".into(),
                keywords: strings(&["gamification"]),
                per_source_query: vec![query("PubMed", "gamification[tiab]")],
            },
            GeneratedBlock {
                subquestion: "Effect on engagement ".into(),
                keywords: strings(&["Gamification", "serious games"]),
                per_source_query: vec![
                    query("pubmed", "ignored"),
                    query("Europe PMC", "serious games"),
                ],
            },
        ])
        .unwrap();

        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].subquestion, "Effect on engagement");
        assert_eq!(blocks[0].keywords, strings(&["gamification", "serious games"]));
        assert_eq!(
            blocks[0].per_source_query,
            vec![
                query("PubMed", "gamification[tiab]"),
                query("Europe PMC", "serious games")
            ]
        );
    }

    #[test]
    fn no_blocks_is_empty() {
        assert!(matches!(shape_blocks(vec![]), Err(GeneratorError::Empty(_))));
    }
}
