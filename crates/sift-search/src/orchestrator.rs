//! Fan-out of one sub-question to the selected sources.
//!
//! Every source is queried concurrently and bounded by the per-source
//! timeout. A failing or slow source only costs its own results; the search
//! fails as a whole only when no source answered.

use std::time::Duration;

use futures::future::join_all;
use sift_core::entities::{ExternalRecord, ResolvedQuery, ResultFilters, SubquestionBlock};
use sift_core::enums::SourceId;
use sift_core::responses::{SourceReport, SourceStatus};
use sift_sources::RecordSource;

use crate::error::Phase2Error;
use crate::filters;

/// Query sent to `source` for `block`.
///
/// The generated per-source query whose database name contains the source
/// label (case-insensitive) wins if it is non-blank; otherwise the keywords
/// joined with `" OR "`; otherwise the sub-question text itself.
#[must_use]
pub fn resolve_query(block: &SubquestionBlock, source: SourceId) -> String {
    if let Some(entry) = block
        .per_source_query
        .iter()
        .find(|entry| source.matches_name(&entry.source) && !entry.query.trim().is_empty())
    {
        return entry.query.trim().to_string();
    }
    if !block.keywords.is_empty() {
        return block.keywords.join(" OR ");
    }
    if block.subquestion.trim().is_empty() {
        block.key.to_string()
    } else {
        block.subquestion.trim().to_string()
    }
}

/// Result of one fan-out.
#[derive(Debug, Clone)]
pub struct Execution {
    /// Filtered records: source order, then each source's native order.
    pub records: Vec<ExternalRecord>,
    /// Records returned before post-filtering.
    pub retrieved: usize,
    pub reports: Vec<SourceReport>,
    pub queries: Vec<ResolvedQuery>,
    /// Filters the records were post-filtered with.
    pub filters: ResultFilters,
}

impl Execution {
    #[must_use]
    pub fn failed_sources(&self) -> Vec<SourceId> {
        self.reports
            .iter()
            .filter(|report| !report.is_ok())
            .map(|report| report.source)
            .collect()
    }
}

pub struct SearchOrchestrator<S> {
    source: S,
    timeout: Duration,
}

impl<S: RecordSource> SearchOrchestrator<S> {
    pub const fn new(source: S, timeout: Duration) -> Self {
        Self { source, timeout }
    }

    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Run `block` against every source in `sources` and post-filter.
    ///
    /// # Errors
    ///
    /// [`Phase2Error::NoSourceSelected`] before any I/O when `sources` is
    /// empty; [`Phase2Error::TotalSourceFailure`] when every source failed.
    pub async fn execute(
        &self,
        block: &SubquestionBlock,
        sources: &[SourceId],
        filters: &ResultFilters,
    ) -> Result<Execution, Phase2Error> {
        if sources.is_empty() {
            return Err(Phase2Error::NoSourceSelected);
        }

        let tasks = sources.iter().map(|&source| {
            let query = resolve_query(block, source);
            async move {
                let outcome = tokio::time::timeout(self.timeout, self.source.query(source, &query)).await;
                (source, query, outcome)
            }
        });
        let outcomes = join_all(tasks).await;

        let mut records = Vec::new();
        let mut reports = Vec::with_capacity(outcomes.len());
        let mut queries = Vec::with_capacity(outcomes.len());
        for (source, query, outcome) in outcomes {
            let report = match outcome {
                Ok(Ok(found)) => {
                    let count = u32::try_from(found.len()).unwrap_or(u32::MAX);
                    records.extend(found);
                    SourceReport {
                        source,
                        query: query.clone(),
                        status: SourceStatus::Ok,
                        record_count: count,
                        error: None,
                    }
                }
                Ok(Err(e)) => {
                    tracing::warn!(%source, %e, "source query failed");
                    SourceReport {
                        source,
                        query: query.clone(),
                        status: SourceStatus::Failed,
                        record_count: 0,
                        error: Some(e.to_string()),
                    }
                }
                Err(_) => {
                    tracing::warn!(%source, timeout_secs = self.timeout.as_secs(), "source query timed out");
                    SourceReport {
                        source,
                        query: query.clone(),
                        status: SourceStatus::TimedOut,
                        record_count: 0,
                        error: Some(format!("timed out after {}s", self.timeout.as_secs())),
                    }
                }
            };
            reports.push(report);
            queries.push(ResolvedQuery { source, query });
        }

        if reports.iter().all(|report| !report.is_ok()) {
            return Err(Phase2Error::TotalSourceFailure { reports });
        }

        let retrieved = records.len();
        let records = filters::apply(records, filters);
        tracing::debug!(
            subquestion = %block.key,
            retrieved,
            kept = records.len(),
            "search fan-out complete"
        );
        Ok(Execution {
            records,
            retrieved,
            reports,
            queries,
            filters: *filters,
        })
    }
}
