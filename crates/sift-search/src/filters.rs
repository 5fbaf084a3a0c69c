//! Post-filters over a merged result set.
//!
//! Two independent predicates: drop records without a year (when
//! `hide_missing_year`), and drop records whose year is outside the range
//! (when `enforce_year_range`; missing years pass this one). Because each is
//! a per-record predicate, their order does not matter.

use sift_core::entities::{ExternalRecord, ResultFilters};

#[must_use]
pub fn passes_missing_year(record: &ExternalRecord, filters: &ResultFilters) -> bool {
    !filters.hide_missing_year || record.year.is_some()
}

#[must_use]
pub fn passes_year_range(record: &ExternalRecord, filters: &ResultFilters) -> bool {
    match record.year {
        Some(year) if filters.enforce_year_range => filters.year_range.contains(year),
        _ => true,
    }
}

/// Keep the records that pass both predicates, preserving order.
#[must_use]
pub fn apply(records: Vec<ExternalRecord>, filters: &ResultFilters) -> Vec<ExternalRecord> {
    records
        .into_iter()
        .filter(|record| passes_missing_year(record, filters) && passes_year_range(record, filters))
        .collect()
}
