//! Pure transitions over the phase-2 aggregate.
//!
//! Every function takes a snapshot (by value or reference) and either
//! returns the next snapshot or rejects the command. Nothing here performs
//! I/O; [`crate::service`] reads the latest snapshot inside a store
//! transaction, applies one of these, and commits the result.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use sift_core::entities::{
    ConceptTerm, ExternalRecord, LastSearch, Phase2State, ResultFilters, ResultSet, Strategy,
    SubquestionBlock, SubquestionLog,
};
use sift_core::enums::SourceId;
use sift_core::keys::SubquestionKey;
use sift_core::responses::SaveCounts;

use crate::error::Phase2Error;
use crate::orchestrator::Execution;

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

fn block_of<'a>(
    state: &'a Phase2State,
    key: &SubquestionKey,
) -> Result<&'a SubquestionBlock, Phase2Error> {
    state
        .block(key)
        .ok_or_else(|| Phase2Error::InvalidState(format!("unknown sub-question: {key}")))
}

/// Resolve user input to a key: an exact (normalized) key first, then a
/// 1-based position among all blocks.
///
/// # Errors
///
/// [`Phase2Error::InvalidState`] when neither matches.
pub fn resolve_key(state: &Phase2State, input: &str) -> Result<SubquestionKey, Phase2Error> {
    let key = SubquestionKey::normalize(input);
    if state.block(&key).is_some() {
        return Ok(key);
    }
    input
        .trim()
        .trim_start_matches('#')
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|index| state.blocks().get(index))
        .map(|block| block.key.clone())
        .ok_or_else(|| Phase2Error::InvalidState(format!("unknown sub-question: {key}")))
}

// ── Search ─────────────────────────────────────────────────────────

/// Guards for starting a search: the key exists, is visible, is not
/// locked, and at least one source is selected.
///
/// # Errors
///
/// [`Phase2Error::InvalidState`] or [`Phase2Error::NoSourceSelected`].
pub fn searchable_block<'a>(
    state: &'a Phase2State,
    key: &SubquestionKey,
) -> Result<&'a SubquestionBlock, Phase2Error> {
    let block = block_of(state, key)?;
    if state.is_locked(key) {
        return Err(Phase2Error::InvalidState(format!(
            "sub-question already completed: {key}"
        )));
    }
    if state.is_hidden(key) {
        return Err(Phase2Error::InvalidState(format!("sub-question is hidden: {key}")));
    }
    if state.selected_sources.is_empty() {
        return Err(Phase2Error::NoSourceSelected);
    }
    Ok(block)
}

/// Record a finished search against the latest snapshot.
///
/// `savedCount`, `savedAt`, and the save batch carry over from the previous
/// log for the key.
///
/// # Errors
///
/// [`Phase2Error::InvalidState`] if the key was locked or removed while the
/// search was running.
pub fn record_search(
    mut state: Phase2State,
    key: &SubquestionKey,
    execution: &Execution,
    now: DateTime<Utc>,
) -> Result<(Phase2State, SubquestionLog), Phase2Error> {
    let block = block_of(&state, key)?;
    if state.is_locked(key) {
        return Err(Phase2Error::InvalidState(format!(
            "sub-question was completed during the search: {key}"
        )));
    }

    let previous = state.logs.get(key);
    let log = SubquestionLog {
        subquestion_key: key.clone(),
        subquestion: block.subquestion.clone(),
        last_search_at: Some(now),
        saved_at: previous.and_then(|log| log.saved_at),
        sources_used: execution.reports.iter().map(|report| report.source).collect(),
        year_filter: execution.filters.year_range,
        hide_missing_year: execution.filters.hide_missing_year,
        enforce_year_range: execution.filters.enforce_year_range,
        keywords_used: block.keywords.clone(),
        queries_used: execution.queries.clone(),
        failed_sources: execution.failed_sources(),
        total_results: count(execution.records.len()),
        saved_count: previous.map_or(0, |log| log.saved_count),
        save_batch: previous.and_then(|log| log.save_batch.clone()),
    };

    state.logs.insert(key.clone(), log.clone());
    state.searched_subquestion_keys.insert(key.clone());
    state.last_search = Some(LastSearch {
        at: now,
        subquestion_key: key.clone(),
        result_count: log.total_results,
    });
    Ok((state, log))
}

/// Human-readable summary of a search.
#[must_use]
pub fn status_message(first_search: bool, subquestion: &str, results: usize) -> String {
    match (results, first_search) {
        (0, _) => format!("No results for \"{subquestion}\"."),
        (n, true) => format!("{n} results for \"{subquestion}\"."),
        (_, false) => format!("Results updated for \"{subquestion}\"."),
    }
}

// ── Save ───────────────────────────────────────────────────────────

/// Pick the records to save from the current result set.
///
/// An empty selection is only accepted when the result set itself is empty.
///
/// # Errors
///
/// [`Phase2Error::InvalidState`] without a result set, for ids that are not
/// part of it, or for an empty selection from a non-empty set.
pub fn select_for_save(
    result_set: Option<&ResultSet>,
    ids: &[String],
) -> Result<(SubquestionKey, Vec<ExternalRecord>), Phase2Error> {
    let Some(set) = result_set else {
        return Err(Phase2Error::InvalidState("no search results to save".into()));
    };
    let unknown = set.unknown_ids(ids);
    if !unknown.is_empty() {
        return Err(Phase2Error::InvalidState(format!(
            "records not in the current results: {}",
            unknown.join(", ")
        )));
    }
    if ids.is_empty() && !set.records.is_empty() {
        return Err(Phase2Error::InvalidState(
            "select at least one record to save".into(),
        ));
    }
    Ok((set.subquestion_key.clone(), set.select(ids)))
}

/// Identity of a save: order-independent hash of the selected records.
#[must_use]
pub fn save_batch_id(records: &[ExternalRecord]) -> String {
    let mut identities: Vec<String> = records
        .iter()
        .map(|record| {
            record.dedup_key().map_or_else(
                || format!("id:{}:{}", record.source, record.external_id),
                |key| key.to_string(),
            )
        })
        .collect();
    identities.sort();
    identities.dedup();

    let mut hasher = Sha256::new();
    for identity in &identities {
        hasher.update(identity.as_bytes());
        hasher.update(b"\n");
    }
    hex::encode(hasher.finalize())
}

/// Whether `key` was already locked by this exact batch.
#[must_use]
pub fn is_replayed_save(state: &Phase2State, key: &SubquestionKey, batch: &str) -> bool {
    state.is_locked(key)
        && state
            .logs
            .get(key)
            .and_then(|log| log.save_batch.as_deref())
            == Some(batch)
}

/// Guards for saving: the key exists, is visible, was searched, and is not
/// locked.
///
/// # Errors
///
/// [`Phase2Error::InvalidState`].
pub fn ensure_saveable(state: &Phase2State, key: &SubquestionKey) -> Result<(), Phase2Error> {
    block_of(state, key)?;
    if state.is_locked(key) {
        return Err(Phase2Error::InvalidState(format!(
            "sub-question already completed: {key}"
        )));
    }
    if state.is_hidden(key) {
        return Err(Phase2Error::InvalidState(format!(
            "sub-question is hidden: {key}"
        )));
    }
    if !state.searched_subquestion_keys.contains(key) {
        return Err(Phase2Error::InvalidState(format!(
            "sub-question has not been searched: {key}"
        )));
    }
    Ok(())
}

/// Lock `key` and record the save in its log.
///
/// # Errors
///
/// Same guards as [`ensure_saveable`].
pub fn record_save(
    mut state: Phase2State,
    key: &SubquestionKey,
    counts: SaveCounts,
    batch: String,
    now: DateTime<Utc>,
) -> Result<Phase2State, Phase2Error> {
    ensure_saveable(&state, key)?;

    let log = match state.logs.remove(key) {
        Some(log) => log,
        None => fresh_log(&state, key)?,
    };
    state.logs.insert(
        key.clone(),
        SubquestionLog {
            saved_at: Some(now),
            saved_count: counts.saved_count,
            save_batch: Some(batch),
            last_search_at: log.last_search_at.or(Some(now)),
            ..log
        },
    );
    state.locked_subquestion_keys.insert(key.clone());
    Ok(state)
}

/// Log for a key that has none yet, from the block and current settings.
fn fresh_log(state: &Phase2State, key: &SubquestionKey) -> Result<SubquestionLog, Phase2Error> {
    let block = block_of(state, key)?;
    Ok(SubquestionLog {
        subquestion_key: key.clone(),
        subquestion: block.subquestion.clone(),
        last_search_at: None,
        saved_at: None,
        sources_used: state.selected_sources.clone(),
        year_filter: state.filters.year_range,
        hide_missing_year: state.filters.hide_missing_year,
        enforce_year_range: state.filters.enforce_year_range,
        keywords_used: block.keywords.clone(),
        queries_used: vec![],
        failed_sources: vec![],
        total_results: 0,
        saved_count: 0,
        save_batch: None,
    })
}

// ── Visibility and locks ───────────────────────────────────────────

/// Hide a sub-question. Hiding an already hidden key is a no-op.
///
/// # Errors
///
/// [`Phase2Error::InvalidState`] for an unknown or locked key, or when it is
/// the last visible one.
pub fn hide(mut state: Phase2State, key: &SubquestionKey) -> Result<Phase2State, Phase2Error> {
    block_of(&state, key)?;
    if state.is_hidden(key) {
        return Ok(state);
    }
    if state.is_locked(key) {
        return Err(Phase2Error::InvalidState(format!(
            "completed sub-questions cannot be hidden: {key}"
        )));
    }
    if state.visible_keys().len() <= 1 {
        return Err(Phase2Error::InvalidState(
            "at least one sub-question must remain visible".into(),
        ));
    }
    state.hidden_subquestion_keys.insert(key.clone());
    Ok(state)
}

/// Administrative unlock. Clears the save batch so the key can be saved
/// again, and the documentation, which no longer reflects a complete phase.
///
/// # Errors
///
/// [`Phase2Error::InvalidState`] when the key is not locked.
pub fn unlock(mut state: Phase2State, key: &SubquestionKey) -> Result<Phase2State, Phase2Error> {
    if !state.locked_subquestion_keys.remove(key) {
        return Err(Phase2Error::InvalidState(format!("sub-question is not locked: {key}")));
    }
    if let Some(log) = state.logs.get_mut(key) {
        log.save_batch = None;
    }
    state.documentation_text = None;
    state.documentation_generated_at = None;
    Ok(state)
}

// ── Settings ───────────────────────────────────────────────────────

/// Replace the source selection, dropping repeats.
#[must_use]
pub fn select_sources(mut state: Phase2State, sources: &[SourceId]) -> Phase2State {
    let mut selected: Vec<SourceId> = Vec::with_capacity(sources.len());
    for &source in sources {
        if !selected.contains(&source) {
            selected.push(source);
        }
    }
    state.selected_sources = selected;
    state
}

/// # Errors
///
/// [`Phase2Error::Precondition`] for an inverted year range.
pub fn set_filters(mut state: Phase2State, filters: ResultFilters) -> Result<Phase2State, Phase2Error> {
    if filters.year_range.from > filters.year_range.to {
        return Err(Phase2Error::Precondition(format!(
            "year range {}-{} is inverted",
            filters.year_range.from, filters.year_range.to
        )));
    }
    state.filters = filters;
    Ok(state)
}

// ── Regeneration ───────────────────────────────────────────────────

/// Regeneration over searched or saved work needs `confirm`.
///
/// # Errors
///
/// [`Phase2Error::RegenerationNeedsConfirmation`] listing the locked keys.
pub fn regeneration_guard(state: &Phase2State, confirm: bool) -> Result<(), Phase2Error> {
    if confirm || (!state.has_locked_work() && state.logs.is_empty()) {
        return Ok(());
    }
    Err(Phase2Error::RegenerationNeedsConfirmation {
        locked_keys: state.locked_subquestion_keys.iter().cloned().collect(),
    })
}

/// Hidden and searched keys and documentation are reset; locks and logs stay.
fn reset_progress(state: &mut Phase2State) {
    state.hidden_subquestion_keys.clear();
    state.searched_subquestion_keys.clear();
    state.documentation_text = None;
    state.documentation_generated_at = None;
}

/// Install a new concept matrix, replacing the whole strategy.
#[must_use]
pub fn apply_matrix(
    mut state: Phase2State,
    question: String,
    concept_matrix: Vec<ConceptTerm>,
    recommendations: Vec<String>,
) -> Phase2State {
    state.strategy = Some(Strategy {
        question,
        concept_matrix,
        subquestion_blocks: vec![],
        recommendations,
    });
    reset_progress(&mut state);
    state
}

/// The concept matrix of the current strategy, if it has one.
///
/// # Errors
///
/// [`Phase2Error::Precondition`] without a non-empty matrix.
pub fn require_matrix(state: &Phase2State) -> Result<&[ConceptTerm], Phase2Error> {
    state
        .strategy
        .as_ref()
        .map(|strategy| strategy.concept_matrix.as_slice())
        .filter(|matrix| !matrix.is_empty())
        .ok_or_else(|| {
            Phase2Error::Precondition("derive the concept matrix before the sub-question keywords".into())
        })
}

/// Install new sub-question blocks, keeping the concept matrix.
///
/// # Errors
///
/// [`Phase2Error::Precondition`] when the snapshot has no matrix.
pub fn apply_blocks(
    mut state: Phase2State,
    question: Option<String>,
    blocks: Vec<SubquestionBlock>,
    recommendations: Vec<String>,
) -> Result<Phase2State, Phase2Error> {
    require_matrix(&state)?;
    if let Some(strategy) = state.strategy.as_mut() {
        if let Some(question) = question.filter(|q| !q.trim().is_empty()) {
            strategy.question = question;
        }
        strategy.subquestion_blocks = blocks;
        strategy.recommendations = recommendations;
    }
    reset_progress(&mut state);
    Ok(state)
}

// ── Documentation ──────────────────────────────────────────────────

/// # Errors
///
/// [`Phase2Error::InvalidState`] unless every visible sub-question is locked.
pub fn record_documentation(
    mut state: Phase2State,
    text: String,
    now: DateTime<Utc>,
) -> Result<Phase2State, Phase2Error> {
    ensure_documentable(&state)?;
    state.documentation_text = Some(text);
    state.documentation_generated_at = Some(now);
    Ok(state)
}

/// # Errors
///
/// [`Phase2Error::InvalidState`] unless every visible sub-question is locked.
pub fn ensure_documentable(state: &Phase2State) -> Result<(), Phase2Error> {
    if state.strategy.is_none() {
        return Err(Phase2Error::InvalidState(
            "a generated strategy is required before documenting it".into(),
        ));
    }
    if !state.all_done() {
        return Err(Phase2Error::InvalidState(
            "search and save every sub-question before documenting".into(),
        ));
    }
    Ok(())
}
