//! Defaults applied when a project's phase-2 state is first created.

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use sift_core::entities::{DEFAULT_YEAR_FROM, ResultFilters, YearRange};
use sift_core::enums::SourceId;

use crate::ConfigError;

fn default_sources() -> Vec<SourceId> {
    SourceId::ALL.to_vec()
}

const fn default_year_from() -> i32 {
    DEFAULT_YEAR_FROM
}

const fn default_enforce_year_range() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Sources selected for a new project.
    #[serde(default = "default_sources")]
    pub default_sources: Vec<SourceId>,

    #[serde(default = "default_year_from")]
    pub year_from: i32,

    /// Upper year bound. `None` means the current year.
    #[serde(default)]
    pub year_to: Option<i32>,

    #[serde(default)]
    pub hide_missing_year: bool,

    #[serde(default = "default_enforce_year_range")]
    pub enforce_year_range: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_sources: default_sources(),
            year_from: default_year_from(),
            year_to: None,
            hide_missing_year: false,
            enforce_year_range: default_enforce_year_range(),
        }
    }
}

impl SearchConfig {
    /// Initial filters for a new project.
    #[must_use]
    pub fn filters(&self) -> ResultFilters {
        ResultFilters {
            year_range: YearRange {
                from: self.year_from,
                to: self.year_to.unwrap_or_else(|| Utc::now().year()),
            },
            hide_missing_year: self.hide_missing_year,
            enforce_year_range: self.enforce_year_range,
        }
    }

    /// Reject an inverted year range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let filters = self.filters();
        if filters.year_range.from > filters.year_range.to {
            return Err(ConfigError::InvalidValue {
                field: "search.year_from".into(),
                reason: format!(
                    "{} is after the upper bound {}",
                    filters.year_range.from, filters.year_range.to
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = SearchConfig::default();
        assert_eq!(config.default_sources, SourceId::ALL.to_vec());
        let filters = config.filters();
        assert_eq!(filters.year_range.from, 2010);
        assert_eq!(filters.year_range.to, Utc::now().year());
        assert!(!filters.hide_missing_year);
        assert!(filters.enforce_year_range);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn inverted_range_is_invalid() {
        let config = SearchConfig {
            year_from: 2024,
            year_to: Some(2020),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
