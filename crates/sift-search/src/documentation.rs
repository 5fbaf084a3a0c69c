//! Plain-text report of the search phase.
//!
//! The output depends only on the snapshot and the recording time, so the
//! same state always documents the same way.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use sift_core::entities::{Phase2State, SubquestionBlock, SubquestionLog};
use sift_core::enums::format_source_list;

const NOT_RECORDED: &str = "Not recorded";

fn timestamp(value: Option<DateTime<Utc>>) -> String {
    value.map_or_else(
        || NOT_RECORDED.to_string(),
        |at| at.format("%Y-%m-%d %H:%M UTC").to_string(),
    )
}

/// Render the report for every visible sub-question.
///
/// Callers gate this on [`Phase2State::all_done`]; composing an incomplete
/// state still works and documents what is there.
#[must_use]
pub fn compose(state: &Phase2State, recorded_at: DateTime<Utc>) -> String {
    let question = state
        .strategy
        .as_ref()
        .map(|strategy| strategy.question.trim())
        .filter(|question| !question.is_empty())
        .unwrap_or("Untitled question");
    let range = state.filters.year_range;

    let mut out = String::new();
    let _ = writeln!(out, "Recorded on: {}", recorded_at.format("%B %-d, %Y"));
    let _ = writeln!(out, "Main question: {question}");
    let _ = writeln!(
        out,
        "Sources consulted: {}",
        format_source_list(&state.selected_sources)
    );
    let _ = writeln!(out, "Year range applied: {} - {}", range.from, range.to);
    let _ = writeln!(out);
    let _ = writeln!(out, "Documented sub-questions:");

    for (index, block) in state.visible_blocks().into_iter().enumerate() {
        section(&mut out, index + 1, block, state.logs.get(&block.key), state);
    }
    out
}

fn section(
    out: &mut String,
    number: usize,
    block: &SubquestionBlock,
    log: Option<&SubquestionLog>,
    state: &Phase2State,
) {
    let title = if block.subquestion.trim().is_empty() {
        block.key.as_str()
    } else {
        block.subquestion.trim()
    };
    let sources = log.map_or(state.selected_sources.as_slice(), |log| log.sources_used.as_slice());
    let keywords = log.map_or(block.keywords.as_slice(), |log| log.keywords_used.as_slice());
    let keywords = if keywords.is_empty() {
        String::from("No keywords recorded")
    } else {
        keywords.join(", ")
    };

    let _ = writeln!(out, "#{number} {title}");
    let _ = writeln!(out, "- Sources used: {}", format_source_list(sources));
    let _ = writeln!(out, "- Keywords applied: {keywords}");
    let _ = writeln!(out, "- Visible results: {}", log.map_or(0, |log| log.total_results));
    let _ = writeln!(out, "- Candidates saved: {}", log.map_or(0, |log| log.saved_count));
    let _ = writeln!(out, "- Last search: {}", timestamp(log.and_then(|log| log.last_search_at)));
    let _ = writeln!(out, "- Saved on: {}", timestamp(log.and_then(|log| log.saved_at)));
    let _ = writeln!(out, "- Queries per source:");

    match log.filter(|log| !log.queries_used.is_empty()) {
        Some(log) => {
            for entry in &log.queries_used {
                let _ = writeln!(out, "   · {}: {}", entry.source.label(), query_or_missing(&entry.query));
            }
        }
        None => {
            for entry in &block.per_source_query {
                let name = if entry.source.is_empty() { "Unnamed source" } else { entry.source.as_str() };
                let _ = writeln!(out, "   · {name}: {}", query_or_missing(&entry.query));
            }
        }
    }
    if log.is_none() {
        let _ = writeln!(
            out,
            "   · Notes: this sub-question was completed before detailed logging."
        );
    }
    let _ = writeln!(out);
}

fn query_or_missing(query: &str) -> &str {
    if query.trim().is_empty() {
        "Query not available"
    } else {
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use sift_core::entities::{
        ResolvedQuery, ResultFilters, SourceQuery, Strategy, SubquestionBlock, YearRange,
    };
    use sift_core::enums::SourceId;
    use sift_core::keys::SubquestionKey;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, 9, 30, 0).unwrap()
    }

    fn block(text: &str) -> SubquestionBlock {
        SubquestionBlock {
            key: SubquestionKey::normalize(text),
            subquestion: text.into(),
            keywords: vec!["gamification".into()],
            per_source_query: vec![SourceQuery {
                source: "PubMed".into(),
                query: "gamification[tiab]".into(),
                filters: None,
                estimated_results: None,
            }],
        }
    }

    fn state() -> Phase2State {
        let mut state = Phase2State::new(
            vec![SourceId::PubMed, SourceId::CrossRef],
            ResultFilters {
                year_range: YearRange { from: 2015, to: 2026 },
                ..ResultFilters::default()
            },
        );
        state.strategy = Some(Strategy {
            question: "Does gamification improve engagement?".into(),
            subquestion_blocks: vec![block("A"), block("B"), block("C")],
            ..Strategy::default()
        });
        state.hidden_subquestion_keys.insert(SubquestionKey::normalize("C"));
        state.logs.insert(
            SubquestionKey::normalize("A"),
            SubquestionLog {
                subquestion_key: SubquestionKey::normalize("A"),
                subquestion: "A".into(),
                last_search_at: Some(at(2)),
                saved_at: Some(at(3)),
                sources_used: vec![SourceId::PubMed],
                year_filter: YearRange { from: 2015, to: 2026 },
                hide_missing_year: false,
                enforce_year_range: true,
                keywords_used: vec!["gamification".into(), "serious games".into()],
                queries_used: vec![ResolvedQuery {
                    source: SourceId::PubMed,
                    query: "gamification OR serious games".into(),
                }],
                failed_sources: vec![],
                total_results: 3,
                saved_count: 2,
                save_batch: Some("b".into()),
            },
        );
        state
    }

    #[test]
    fn composes_header_and_visible_sections() {
        let text = compose(&state(), at(5));
        let expected = "\
Recorded on: March 5, 2026
Main question: Does gamification improve engagement?
Sources consulted: PubMed, CrossRef
Year range applied: 2015 - 2026

Documented sub-questions:
#1 A
- Sources used: PubMed
- Keywords applied: gamification, serious games
- Visible results: 3
- Candidates saved: 2
- Last search: 2026-03-02 09:30 UTC
- Saved on: 2026-03-03 09:30 UTC
- Queries per source:
   · PubMed: gamification OR serious games

#2 B
- Sources used: PubMed, CrossRef
- Keywords applied: gamification
- Visible results: 0
- Candidates saved: 0
- Last search: Not recorded
- Saved on: Not recorded
- Queries per source:
   · PubMed: gamification[tiab]
   · Notes: this sub-question was completed before detailed logging.

";
        assert_eq!(text, expected);
    }

    #[test]
    fn composition_is_deterministic() {
        assert_eq!(compose(&state(), at(5)), compose(&state(), at(5)));
    }

    #[test]
    fn hidden_sections_are_left_out() {
        let text = compose(&state(), at(5));
        assert!(!text.contains("#3"));
        assert!(!text.contains("\n#2 C"));
    }
}
