use chrono::{DateTime, Datelike, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::SourceId;
use crate::keys::SubquestionKey;

/// Earliest year of the default range.
pub const DEFAULT_YEAR_FROM: i32 = 2010;

/// Inclusive publication-year range.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct YearRange {
    pub from: i32,
    pub to: i32,
}

impl YearRange {
    #[must_use]
    pub const fn contains(self, year: i32) -> bool {
        year >= self.from && year <= self.to
    }
}

impl Default for YearRange {
    /// `2010` through the current year.
    fn default() -> Self {
        Self {
            from: DEFAULT_YEAR_FROM,
            to: Utc::now().year(),
        }
    }
}

/// Post-filters applied to the merged result set of a search.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ResultFilters {
    #[serde(default)]
    pub year_range: YearRange,
    /// Drop records without a publication year.
    #[serde(default)]
    pub hide_missing_year: bool,
    /// Drop records whose year falls outside `year_range`.
    #[serde(default = "default_true")]
    pub enforce_year_range: bool,
}

const fn default_true() -> bool {
    true
}

impl Default for ResultFilters {
    fn default() -> Self {
        Self {
            year_range: YearRange::default(),
            hide_missing_year: false,
            enforce_year_range: true,
        }
    }
}

/// The query string actually sent to one source.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ResolvedQuery {
    pub source: SourceId,
    pub query: String,
}

/// Per-sub-question record of the latest search and save.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SubquestionLog {
    pub subquestion_key: SubquestionKey,
    pub subquestion: String,
    pub last_search_at: Option<DateTime<Utc>>,
    pub saved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub sources_used: Vec<SourceId>,
    pub year_filter: YearRange,
    #[serde(default)]
    pub hide_missing_year: bool,
    #[serde(default)]
    pub enforce_year_range: bool,
    #[serde(default)]
    pub keywords_used: Vec<String>,
    #[serde(default)]
    pub queries_used: Vec<ResolvedQuery>,
    /// Sources that failed during the latest search.
    #[serde(default)]
    pub failed_sources: Vec<SourceId>,
    pub total_results: u32,
    pub saved_count: u32,
    /// Identity of the save batch that locked this sub-question.
    #[serde(default)]
    pub save_batch: Option<String>,
}
