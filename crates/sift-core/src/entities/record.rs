use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{ScreeningStatus, SourceId};
use crate::keys::{DedupKey, SubquestionKey};

/// Raw unit returned by a bibliographic source query.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ExternalRecord {
    /// Source-native identifier (e.g., PMID, Semantic Scholar paper id).
    pub external_id: String,
    pub source: SourceId,
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    pub year: Option<i32>,
    #[serde(default, rename = "abstract")]
    pub abstract_text: String,
    pub doi: Option<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub is_open_access: bool,
    pub citation_count: Option<u64>,
}

impl ExternalRecord {
    #[must_use]
    pub fn has_usable_title(&self) -> bool {
        !self.title.trim().is_empty()
    }

    #[must_use]
    pub fn has_abstract(&self) -> bool {
        !self.abstract_text.trim().is_empty()
    }

    /// Dedup key for this record, or `None` if it has no derivable identity.
    #[must_use]
    pub fn dedup_key(&self) -> Option<DedupKey> {
        DedupKey::derive(self.doi.as_deref(), &self.title, self.year)
    }
}

/// A record persisted into a project's candidate set.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Candidate {
    #[serde(flatten)]
    pub record: ExternalRecord,
    pub dedup_key: DedupKey,
    pub project_id: String,
    /// Sub-question under which the record was first saved.
    pub subquestion_key: Option<SubquestionKey>,
    pub saved_at: DateTime<Utc>,
    pub screening_status: ScreeningStatus,
}
