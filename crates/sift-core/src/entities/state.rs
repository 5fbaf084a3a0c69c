use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{ResultFilters, Strategy, SubquestionBlock, SubquestionLog};
use crate::enums::{SourceId, SubquestionPhase};
use crate::keys::SubquestionKey;
use crate::responses::{ChecklistItem, StateSummary, SubquestionStatus};

/// Metadata about the most recent search in the project.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct LastSearch {
    pub at: DateTime<Utc>,
    pub subquestion_key: SubquestionKey,
    pub result_count: u32,
}

/// The single phase-2 aggregate persisted per project.
///
/// Values are treated as immutable snapshots: transitions take a snapshot and
/// return a new one, and the store persists whole snapshots.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Phase2State {
    #[serde(default)]
    pub strategy: Option<Strategy>,
    #[serde(default)]
    pub hidden_subquestion_keys: BTreeSet<SubquestionKey>,
    #[serde(default)]
    pub locked_subquestion_keys: BTreeSet<SubquestionKey>,
    #[serde(default)]
    pub searched_subquestion_keys: BTreeSet<SubquestionKey>,
    #[serde(default)]
    pub selected_sources: Vec<SourceId>,
    #[serde(default)]
    pub filters: ResultFilters,
    #[serde(default)]
    pub logs: BTreeMap<SubquestionKey, SubquestionLog>,
    #[serde(default)]
    pub last_search: Option<LastSearch>,
    #[serde(default)]
    pub documentation_text: Option<String>,
    #[serde(default)]
    pub documentation_generated_at: Option<DateTime<Utc>>,
    /// Bumped by the store on every persisted write.
    #[serde(default)]
    pub revision: u64,
}

impl Default for Phase2State {
    fn default() -> Self {
        Self::new(SourceId::ALL.to_vec(), ResultFilters::default())
    }
}

impl Phase2State {
    #[must_use]
    pub fn new(selected_sources: Vec<SourceId>, filters: ResultFilters) -> Self {
        Self {
            strategy: None,
            hidden_subquestion_keys: BTreeSet::new(),
            locked_subquestion_keys: BTreeSet::new(),
            searched_subquestion_keys: BTreeSet::new(),
            selected_sources,
            filters,
            logs: BTreeMap::new(),
            last_search: None,
            documentation_text: None,
            documentation_generated_at: None,
            revision: 0,
        }
    }

    /// All sub-question blocks in declaration order (empty without a strategy).
    #[must_use]
    pub fn blocks(&self) -> &[SubquestionBlock] {
        self.strategy
            .as_ref()
            .map_or(&[], |strategy| strategy.subquestion_blocks.as_slice())
    }

    #[must_use]
    pub fn block(&self, key: &SubquestionKey) -> Option<&SubquestionBlock> {
        self.blocks().iter().find(|block| &block.key == key)
    }

    /// Blocks that are not hidden, in declaration order.
    #[must_use]
    pub fn visible_blocks(&self) -> Vec<&SubquestionBlock> {
        self.blocks()
            .iter()
            .filter(|block| !self.hidden_subquestion_keys.contains(&block.key))
            .collect()
    }

    #[must_use]
    pub fn visible_keys(&self) -> Vec<&SubquestionKey> {
        self.visible_blocks().into_iter().map(|block| &block.key).collect()
    }

    #[must_use]
    pub fn is_locked(&self, key: &SubquestionKey) -> bool {
        self.locked_subquestion_keys.contains(key)
    }

    #[must_use]
    pub fn is_hidden(&self, key: &SubquestionKey) -> bool {
        self.hidden_subquestion_keys.contains(key)
    }

    /// Persisted lifecycle phase. `Searching` is never persisted; callers
    /// that track in-flight searches overlay it themselves.
    #[must_use]
    pub fn phase_of(&self, key: &SubquestionKey) -> SubquestionPhase {
        if self.is_locked(key) {
            SubquestionPhase::Locked
        } else if self.searched_subquestion_keys.contains(key) {
            SubquestionPhase::Searched
        } else {
            SubquestionPhase::Unsearched
        }
    }

    /// True iff there is at least one visible sub-question and all of them
    /// are locked.
    #[must_use]
    pub fn all_done(&self) -> bool {
        let visible = self.visible_keys();
        !visible.is_empty() && visible.iter().all(|key| self.is_locked(key))
    }

    /// Locked keys that no longer appear in the current strategy.
    #[must_use]
    pub fn orphaned_locks(&self) -> Vec<SubquestionKey> {
        self.locked_subquestion_keys
            .iter()
            .filter(|key| self.block(key).is_none())
            .cloned()
            .collect()
    }

    /// Whether regenerating the strategy would run over saved work.
    #[must_use]
    pub fn has_locked_work(&self) -> bool {
        !self.locked_subquestion_keys.is_empty()
    }

    /// Phase checklist: keywords, queries, search, documentation.
    #[must_use]
    pub fn checklist(&self) -> Vec<ChecklistItem> {
        let strategy = self.strategy.as_ref();
        let item = |id: &str, label: &str, completed: bool| ChecklistItem {
            id: id.to_string(),
            label: label.to_string(),
            completed,
        };
        vec![
            item(
                "keywords",
                "Extract terms and synonyms",
                strategy.is_some_and(|s| !s.concept_matrix.is_empty()),
            ),
            item(
                "queries",
                "Design search strings per sub-question",
                strategy.is_some_and(|s| !s.subquestion_blocks.is_empty()),
            ),
            item("search", "Search and save every sub-question", self.all_done()),
            item(
                "documentation",
                "Document the search strategy",
                self.documentation_generated_at.is_some(),
            ),
        ]
    }

    /// Condensed view rendered by `sift state`.
    #[must_use]
    pub fn summary(&self, project_id: &str) -> StateSummary {
        let subquestions = self
            .blocks()
            .iter()
            .map(|block| {
                let log = self.logs.get(&block.key);
                SubquestionStatus {
                    key: block.key.clone(),
                    phase: self.phase_of(&block.key),
                    hidden: self.is_hidden(&block.key),
                    total_results: log.map(|log| log.total_results),
                    saved_count: log.map(|log| log.saved_count),
                }
            })
            .collect();

        StateSummary {
            project_id: project_id.to_string(),
            revision: self.revision,
            selected_sources: self.selected_sources.clone(),
            subquestions,
            checklist: self.checklist(),
            all_done: self.all_done(),
            orphaned_locks: self.orphaned_locks(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(text: &str) -> SubquestionBlock {
        SubquestionBlock {
            key: SubquestionKey::normalize(text),
            subquestion: text.to_string(),
            keywords: vec![],
            per_source_query: vec![],
        }
    }

    fn state_with(keys: &[&str]) -> Phase2State {
        let mut state = Phase2State::default();
        state.strategy = Some(Strategy {
            question: "Q".into(),
            subquestion_blocks: keys.iter().map(|k| block(k)).collect(),
            ..Strategy::default()
        });
        state
    }

    #[test]
    fn all_done_requires_visible_keys() {
        let state = Phase2State::default();
        assert!(!state.all_done());
    }

    #[test]
    fn all_done_ignores_hidden_keys() {
        let mut state = state_with(&["A", "B"]);
        state.locked_subquestion_keys.insert(SubquestionKey::normalize("A"));
        assert!(!state.all_done());
        state.hidden_subquestion_keys.insert(SubquestionKey::normalize("B"));
        assert!(state.all_done());
    }

    #[test]
    fn phase_reflects_sets() {
        let mut state = state_with(&["A"]);
        let key = SubquestionKey::normalize("A");
        assert_eq!(state.phase_of(&key), SubquestionPhase::Unsearched);
        state.searched_subquestion_keys.insert(key.clone());
        assert_eq!(state.phase_of(&key), SubquestionPhase::Searched);
        state.locked_subquestion_keys.insert(key.clone());
        assert_eq!(state.phase_of(&key), SubquestionPhase::Locked);
    }

    #[test]
    fn checklist_tracks_progress() {
        let mut state = state_with(&["A"]);
        let done = |state: &Phase2State| {
            state
                .checklist()
                .into_iter()
                .filter(|item| item.completed)
                .map(|item| item.id)
                .collect::<Vec<_>>()
        };
        assert_eq!(done(&state), vec!["queries".to_string()]);
        state.locked_subquestion_keys.insert(SubquestionKey::normalize("A"));
        assert_eq!(done(&state), vec!["queries".to_string(), "search".to_string()]);
    }

    #[test]
    fn orphaned_locks_lists_keys_missing_from_strategy() {
        let mut state = state_with(&["A"]);
        state.locked_subquestion_keys.insert(SubquestionKey::normalize("A"));
        state.locked_subquestion_keys.insert(SubquestionKey::normalize("Old"));
        assert_eq!(state.orphaned_locks(), vec![SubquestionKey::normalize("Old")]);
    }
}
