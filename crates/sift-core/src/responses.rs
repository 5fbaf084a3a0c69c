//! Response types returned by `Phase2Service` and rendered as JSON by `sift`
//! commands.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{ExternalRecord, Strategy, SubquestionLog};
use crate::enums::{SourceId, SubquestionPhase};
use crate::keys::SubquestionKey;

/// Outcome of one source inside a fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SourceStatus {
    Ok,
    Failed,
    TimedOut,
}

/// Per-source report attached to a search outcome.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SourceReport {
    pub source: SourceId,
    pub query: String,
    pub status: SourceStatus,
    pub record_count: u32,
    pub error: Option<String>,
}

impl SourceReport {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == SourceStatus::Ok
    }
}

/// Response from `sift search`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SearchOutcome {
    pub subquestion_key: SubquestionKey,
    pub records: Vec<ExternalRecord>,
    pub log: SubquestionLog,
    pub source_reports: Vec<SourceReport>,
    pub status_message: String,
}

impl SearchOutcome {
    /// Sources that failed or timed out. Non-empty means a partial failure.
    #[must_use]
    pub fn failed_sources(&self) -> Vec<SourceId> {
        self.source_reports
            .iter()
            .filter(|report| !report.is_ok())
            .map(|report| report.source)
            .collect()
    }
}

/// Counts reported by the candidate repository for one save batch.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SaveCounts {
    pub saved_count: u32,
    pub duplicate_count: u32,
    pub rejected_count: u32,
}

/// Response from `sift save`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SaveOutcome {
    pub subquestion_key: SubquestionKey,
    #[serde(flatten)]
    pub counts: SaveCounts,
    /// The same batch was already recorded; nothing was written.
    pub replayed: bool,
    pub all_done: bool,
}

/// Response from `sift strategy derive` / `sift strategy subquestions`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct RegenerationOutcome {
    pub strategy: Strategy,
    /// Locked keys that are not part of the new strategy. Retained, not discarded.
    pub orphaned_locks: Vec<SubquestionKey>,
}

/// Response from `sift docs`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct DocumentationOutcome {
    pub text: String,
    pub generated_at: DateTime<Utc>,
}

/// One row of the phase checklist.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ChecklistItem {
    pub id: String,
    pub label: String,
    pub completed: bool,
}

/// One sub-question line in `sift state`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SubquestionStatus {
    pub key: SubquestionKey,
    pub phase: SubquestionPhase,
    pub hidden: bool,
    pub total_results: Option<u32>,
    pub saved_count: Option<u32>,
}

/// Response from `sift state`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct StateSummary {
    pub project_id: String,
    pub revision: u64,
    pub selected_sources: Vec<SourceId>,
    pub subquestions: Vec<SubquestionStatus>,
    pub checklist: Vec<ChecklistItem>,
    pub all_done: bool,
    pub orphaned_locks: Vec<SubquestionKey>,
}
