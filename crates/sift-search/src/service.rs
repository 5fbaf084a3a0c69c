//! `Phase2Service`: the command surface over one store, one term generator,
//! and one record source.
//!
//! Commands read the latest snapshot, call collaborators outside any
//! transaction, then re-check their guards against the snapshot read inside
//! the write transaction before committing. Reads go straight to the store.

use std::time::Duration;

use chrono::Utc;
use sift_core::entities::{
    Candidate, Phase2State, PrismaCounts, Project, Protocol, ResultFilters, ResultSet,
};
use sift_core::enums::{ScreeningStatus, SourceId, SubquestionPhase};
use sift_core::keys::SubquestionKey;
use sift_core::responses::{
    DocumentationOutcome, RegenerationOutcome, SaveCounts, SaveOutcome, SearchOutcome,
    StateSummary,
};
use sift_sources::RecordSource;
use sift_store::StoreService;

use crate::documentation;
use crate::error::Phase2Error;
use crate::generator::{BlocksRequest, MatrixRequest, TermGenerator, shaping};
use crate::inflight::InFlight;
use crate::orchestrator::SearchOrchestrator;
use crate::tracker;

pub struct Phase2Service<G, S> {
    store: StoreService,
    generator: G,
    orchestrator: SearchOrchestrator<S>,
    in_flight: InFlight,
}

impl<G: TermGenerator, S: RecordSource> Phase2Service<G, S> {
    /// `timeout` bounds each source query of a search.
    pub fn new(store: StoreService, generator: G, source: S, timeout: Duration) -> Self {
        Self {
            store,
            generator,
            orchestrator: SearchOrchestrator::new(source, timeout),
            in_flight: InFlight::default(),
        }
    }

    pub const fn store(&self) -> &StoreService {
        &self.store
    }

    pub const fn generator(&self) -> &G {
        &self.generator
    }

    pub const fn source(&self) -> &S {
        self.orchestrator.source()
    }

    // ── Projects ───────────────────────────────────────────────────

    /// Create a project with an empty aggregate.
    ///
    /// # Errors
    ///
    /// [`Phase2Error::Persistence`] if the store write fails.
    pub async fn initialize_project(
        &self,
        name: &str,
        protocol: &Protocol,
        sources: &[SourceId],
        filters: ResultFilters,
    ) -> Result<Project, Phase2Error> {
        let state = tracker::set_filters(
            tracker::select_sources(Phase2State::default(), sources),
            filters,
        )?;
        let project = self.store.create_project(name, protocol, &state).await?;
        tracing::info!(project_id = %project.id, name, "project initialized");
        Ok(project)
    }

    /// # Errors
    ///
    /// [`Phase2Error::Persistence`] if the read fails or the project is unknown.
    pub async fn project(&self, project_id: &str) -> Result<Project, Phase2Error> {
        Ok(self.store.get_project(project_id).await?)
    }

    /// # Errors
    ///
    /// [`Phase2Error::Persistence`] if the update fails.
    pub async fn update_protocol(
        &self,
        project_id: &str,
        protocol: &Protocol,
    ) -> Result<Project, Phase2Error> {
        Ok(self.store.update_protocol(project_id, protocol).await?)
    }

    // ── Strategy ───────────────────────────────────────────────────

    /// Step one: derive the concept matrix from the project protocol,
    /// replacing the whole strategy.
    ///
    /// # Errors
    ///
    /// [`Phase2Error::NoSourceSelected`],
    /// [`Phase2Error::RegenerationNeedsConfirmation`] without `confirm` over
    /// searched or saved work, [`Phase2Error::GenerationFailure`] (prior
    /// strategy kept), or [`Phase2Error::Persistence`].
    pub async fn generate_derivation(
        &self,
        project_id: &str,
        confirm: bool,
    ) -> Result<RegenerationOutcome, Phase2Error> {
        let project = self.store.get_project(project_id).await?;
        let state = self.store.get_state(project_id).await?;
        if state.selected_sources.is_empty() {
            return Err(Phase2Error::NoSourceSelected);
        }
        tracker::regeneration_guard(&state, confirm)?;

        let generated = self
            .generator
            .concept_matrix(&MatrixRequest {
                protocol: project.protocol.clone(),
            })
            .await?;
        let concepts = shaping::shape_matrix(generated.concepts)?;
        let question = generated
            .question
            .filter(|question| !question.trim().is_empty())
            .unwrap_or_else(|| project.protocol.display_question().to_string());
        let recommendations = shaping::shape_keywords(generated.recommendations);

        let next = self
            .store
            .update_state(project_id, |latest| {
                tracker::regeneration_guard(&latest, confirm)?;
                Ok::<_, Phase2Error>(tracker::apply_matrix(latest, question, concepts, recommendations))
            })
            .await?;
        tracing::info!(project_id, revision = next.revision, "concept matrix derived");
        regeneration_outcome(&next)
    }

    /// Step two: derive per-sub-question keywords and queries from the
    /// current concept matrix.
    ///
    /// # Errors
    ///
    /// [`Phase2Error::Precondition`] without a concept matrix,
    /// [`Phase2Error::NoSourceSelected`],
    /// [`Phase2Error::RegenerationNeedsConfirmation`],
    /// [`Phase2Error::GenerationFailure`], or [`Phase2Error::Persistence`].
    pub async fn generate_subquestion_keywords(
        &self,
        project_id: &str,
        confirm: bool,
    ) -> Result<RegenerationOutcome, Phase2Error> {
        let project = self.store.get_project(project_id).await?;
        let state = self.store.get_state(project_id).await?;
        let concept_matrix = tracker::require_matrix(&state)?.to_vec();
        if state.selected_sources.is_empty() {
            return Err(Phase2Error::NoSourceSelected);
        }
        tracker::regeneration_guard(&state, confirm)?;

        let generated = self
            .generator
            .subquestion_blocks(&BlocksRequest {
                protocol: project.protocol,
                concept_matrix,
                sources: state.selected_sources.clone(),
            })
            .await?;
        let blocks = shaping::shape_blocks(generated.blocks)?;
        let recommendations = shaping::shape_keywords(generated.recommendations);

        let next = self
            .store
            .update_state(project_id, |latest| {
                tracker::regeneration_guard(&latest, confirm)?;
                tracker::apply_blocks(latest, generated.question, blocks, recommendations)
            })
            .await?;
        tracing::info!(
            project_id,
            revision = next.revision,
            blocks = next.blocks().len(),
            "sub-question keywords derived"
        );
        regeneration_outcome(&next)
    }

    // ── Search and save ────────────────────────────────────────────

    /// Search one sub-question across the selected sources and store the
    /// filtered results as the current result set.
    ///
    /// # Errors
    ///
    /// [`Phase2Error::InvalidState`] for an unknown, hidden, locked, or
    /// in-flight key; [`Phase2Error::NoSourceSelected`];
    /// [`Phase2Error::TotalSourceFailure`] (nothing written); or
    /// [`Phase2Error::Persistence`].
    pub async fn search_subquestion(
        &self,
        project_id: &str,
        key: &SubquestionKey,
    ) -> Result<SearchOutcome, Phase2Error> {
        let state = self.store.get_state(project_id).await?;
        let block = tracker::searchable_block(&state, key)?.clone();
        let Some(_guard) = self.in_flight.try_acquire(key) else {
            return Err(Phase2Error::InvalidState(format!(
                "a search for this sub-question is already running: {key}"
            )));
        };

        let execution = self
            .orchestrator
            .execute(&block, &state.selected_sources, &state.filters)
            .await?;
        let now = Utc::now();

        let tx = self.store.begin(project_id).await?;
        let first_search = !tx.state().searched_subquestion_keys.contains(key);
        let (next, log) = tracker::record_search(tx.state().clone(), key, &execution, now)?;
        tx.put_result_set(&ResultSet {
            subquestion_key: key.clone(),
            records: execution.records.clone(),
            source_reports: execution.reports.clone(),
            searched_at: now,
        })
        .await?;
        tx.commit(next).await?;

        let failed = execution.failed_sources();
        if !failed.is_empty() {
            tracing::warn!(project_id, subquestion = %key, failed = failed.len(), "search completed with failed sources");
        }
        tracing::info!(project_id, subquestion = %key, results = execution.records.len(), "search recorded");

        Ok(SearchOutcome {
            subquestion_key: key.clone(),
            status_message: tracker::status_message(
                first_search,
                &block.subquestion,
                execution.records.len(),
            ),
            records: execution.records,
            log,
            source_reports: execution.reports,
        })
    }

    /// Save the selected records of the current result set as candidates
    /// and lock its sub-question, all in one transaction.
    ///
    /// Replaying a save that already locked the key with the same records is
    /// a successful no-op (`replayed = true`) that reports every selected
    /// record as a duplicate.
    ///
    /// # Errors
    ///
    /// [`Phase2Error::InvalidState`] without results, for unknown ids, an
    /// empty selection from non-empty results, or a locked/unsearched key;
    /// [`Phase2Error::Persistence`] (nothing is locked).
    pub async fn save_selected(
        &self,
        project_id: &str,
        candidate_ids: &[String],
    ) -> Result<SaveOutcome, Phase2Error> {
        let tx = self.store.begin(project_id).await?;
        let result_set = tx.result_set().await?;
        let (key, records) = tracker::select_for_save(result_set.as_ref(), candidate_ids)?;
        let batch = tracker::save_batch_id(&records);

        if tracker::is_replayed_save(tx.state(), &key, &batch) {
            let all_done = tx.state().all_done();
            tx.rollback().await?;
            tracing::debug!(project_id, subquestion = %key, "save replayed; nothing written");
            return Ok(SaveOutcome {
                subquestion_key: key,
                counts: SaveCounts {
                    saved_count: 0,
                    duplicate_count: u32::try_from(records.len()).unwrap_or(u32::MAX),
                    rejected_count: 0,
                },
                replayed: true,
                all_done,
            });
        }

        tracker::ensure_saveable(tx.state(), &key)?;
        let now = Utc::now();
        let counts = tx.save_candidates(&key, &records, now).await?;
        let next = tracker::record_save(tx.state().clone(), &key, counts, batch, now)?;
        let committed = tx.commit(next).await?;
        tracing::info!(
            project_id,
            subquestion = %key,
            saved = counts.saved_count,
            duplicates = counts.duplicate_count,
            rejected = counts.rejected_count,
            "sub-question locked"
        );

        Ok(SaveOutcome {
            subquestion_key: key,
            counts,
            replayed: false,
            all_done: committed.all_done(),
        })
    }

    // ── Visibility, settings, admin ────────────────────────────────

    /// # Errors
    ///
    /// [`Phase2Error::InvalidState`] for an unknown or locked key or the last
    /// visible one; [`Phase2Error::Persistence`].
    pub async fn hide_subquestion(
        &self,
        project_id: &str,
        key: &SubquestionKey,
    ) -> Result<Phase2State, Phase2Error> {
        self.store
            .update_state(project_id, |latest| tracker::hide(latest, key))
            .await
    }

    /// # Errors
    ///
    /// [`Phase2Error::Persistence`].
    pub async fn select_sources(
        &self,
        project_id: &str,
        sources: &[SourceId],
    ) -> Result<Phase2State, Phase2Error> {
        self.store
            .update_state(project_id, |latest| {
                Ok::<_, Phase2Error>(tracker::select_sources(latest, sources))
            })
            .await
    }

    /// # Errors
    ///
    /// [`Phase2Error::Precondition`] for an inverted range;
    /// [`Phase2Error::Persistence`].
    pub async fn set_filters(
        &self,
        project_id: &str,
        filters: ResultFilters,
    ) -> Result<Phase2State, Phase2Error> {
        self.store
            .update_state(project_id, |latest| tracker::set_filters(latest, filters))
            .await
    }

    /// Administrative: remove a lock so the sub-question can be searched and
    /// saved again. Saved candidates are kept.
    ///
    /// # Errors
    ///
    /// [`Phase2Error::InvalidState`] when the key is not locked;
    /// [`Phase2Error::Persistence`].
    pub async fn unlock_subquestion(
        &self,
        project_id: &str,
        key: &SubquestionKey,
    ) -> Result<Phase2State, Phase2Error> {
        let next = self
            .store
            .update_state(project_id, |latest| tracker::unlock(latest, key))
            .await?;
        tracing::warn!(project_id, subquestion = %key, "sub-question unlocked by admin");
        Ok(next)
    }

    // ── Documentation ──────────────────────────────────────────────

    /// Compose and store the phase report.
    ///
    /// # Errors
    ///
    /// [`Phase2Error::InvalidState`] until every visible sub-question is
    /// locked; [`Phase2Error::Persistence`].
    pub async fn generate_documentation(
        &self,
        project_id: &str,
    ) -> Result<DocumentationOutcome, Phase2Error> {
        let now = Utc::now();
        let next = self
            .store
            .update_state(project_id, |latest| {
                tracker::ensure_documentable(&latest)?;
                let text = documentation::compose(&latest, now);
                tracker::record_documentation(latest, text, now)
            })
            .await?;
        Ok(DocumentationOutcome {
            text: next.documentation_text.unwrap_or_default(),
            generated_at: now,
        })
    }

    // ── Reads ──────────────────────────────────────────────────────

    /// # Errors
    ///
    /// [`Phase2Error::Persistence`].
    pub async fn state(&self, project_id: &str) -> Result<Phase2State, Phase2Error> {
        Ok(self.store.get_state(project_id).await?)
    }

    /// State summary with in-flight searches shown as `searching`.
    ///
    /// # Errors
    ///
    /// [`Phase2Error::Persistence`].
    pub async fn summary(&self, project_id: &str) -> Result<StateSummary, Phase2Error> {
        let mut summary = self.state(project_id).await?.summary(project_id);
        for status in &mut summary.subquestions {
            if self.in_flight.contains(&status.key) {
                status.phase = SubquestionPhase::Searching;
            }
        }
        Ok(summary)
    }

    /// Resolve user input (key text or 1-based position) to a key.
    ///
    /// # Errors
    ///
    /// [`Phase2Error::InvalidState`] for no match; [`Phase2Error::Persistence`].
    pub async fn resolve_key(
        &self,
        project_id: &str,
        input: &str,
    ) -> Result<SubquestionKey, Phase2Error> {
        tracker::resolve_key(&self.state(project_id).await?, input)
    }

    /// # Errors
    ///
    /// [`Phase2Error::Persistence`].
    pub async fn current_results(&self, project_id: &str) -> Result<Option<ResultSet>, Phase2Error> {
        Ok(self.store.current_result_set(project_id).await?)
    }

    /// # Errors
    ///
    /// [`Phase2Error::Persistence`].
    pub async fn candidates(
        &self,
        project_id: &str,
        status: Option<ScreeningStatus>,
    ) -> Result<Vec<Candidate>, Phase2Error> {
        Ok(self.store.list_candidates(project_id, status).await?)
    }

    /// Record a screening decision for one candidate.
    ///
    /// # Errors
    ///
    /// [`Phase2Error::Persistence`] for an unknown candidate or a transition
    /// the screening lifecycle does not allow.
    pub async fn screen_candidate(
        &self,
        project_id: &str,
        dedup_key: &str,
        status: ScreeningStatus,
    ) -> Result<Candidate, Phase2Error> {
        Ok(self
            .store
            .set_screening_status(project_id, dedup_key, status)
            .await?)
    }

    /// # Errors
    ///
    /// [`Phase2Error::Persistence`].
    pub async fn prisma(&self, project_id: &str) -> Result<PrismaCounts, Phase2Error> {
        Ok(self.store.prisma(project_id).await?)
    }
}

fn regeneration_outcome(state: &Phase2State) -> Result<RegenerationOutcome, Phase2Error> {
    let strategy = state
        .strategy
        .clone()
        .ok_or_else(|| Phase2Error::InvalidState("strategy missing after regeneration".into()))?;
    let orphaned_locks = state.orphaned_locks();
    if !orphaned_locks.is_empty() {
        tracing::warn!(count = orphaned_locks.len(), "locked sub-questions no longer in the strategy");
    }
    Ok(RegenerationOutcome {
        strategy,
        orphaned_locks,
    })
}
