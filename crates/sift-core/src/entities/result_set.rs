use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::ExternalRecord;
use crate::keys::SubquestionKey;
use crate::responses::SourceReport;

/// The filtered records of the most recent search, kept between commands so a
/// later save can pick from them.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ResultSet {
    pub subquestion_key: SubquestionKey,
    pub records: Vec<ExternalRecord>,
    #[serde(default)]
    pub source_reports: Vec<SourceReport>,
    pub searched_at: DateTime<Utc>,
}

impl ResultSet {
    /// Records whose `external_id` is in `ids`, in result order.
    #[must_use]
    pub fn select(&self, ids: &[String]) -> Vec<ExternalRecord> {
        self.records
            .iter()
            .filter(|record| ids.contains(&record.external_id))
            .cloned()
            .collect()
    }

    /// Requested ids that are not part of this result set.
    #[must_use]
    pub fn unknown_ids<'a>(&self, ids: &'a [String]) -> Vec<&'a str> {
        ids.iter()
            .filter(|id| !self.records.iter().any(|r| &r.external_id == *id))
            .map(String::as_str)
            .collect()
    }
}
