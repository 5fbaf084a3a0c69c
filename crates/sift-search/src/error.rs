//! Phase-2 error types for sift-search.

use sift_core::keys::SubquestionKey;
use sift_core::responses::SourceReport;
use sift_store::error::DatabaseError;

use crate::generator::GeneratorError;

/// Errors from phase-2 commands.
#[derive(Debug, thiserror::Error)]
pub enum Phase2Error {
    /// The term generator failed or produced nothing usable. The prior
    /// strategy is kept.
    #[error("generation failed: {0}")]
    GenerationFailure(#[from] GeneratorError),

    /// The caller invoked a command out of order (e.g., keywords before a
    /// concept matrix exists).
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// No bibliographic source is selected.
    #[error("no source selected")]
    NoSourceSelected,

    /// The command is not allowed in the current state.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Every selected source failed. Nothing was written.
    #[error("all {} selected sources failed", .reports.len())]
    TotalSourceFailure { reports: Vec<SourceReport> },

    /// A store read or write failed. Nothing was marked locked.
    #[error("persistence failure: {0}")]
    Persistence(#[from] DatabaseError),

    /// Regenerating would run over searched or saved sub-questions.
    #[error(
        "regeneration needs confirmation: {} locked sub-question(s) would be kept",
        .locked_keys.len()
    )]
    RegenerationNeedsConfirmation { locked_keys: Vec<SubquestionKey> },
}

impl Phase2Error {
    /// Whether retrying the same command may succeed without other changes.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::TotalSourceFailure { .. }
            | Self::Persistence(DatabaseError::StaleRevision { .. }) => true,
            Self::GenerationFailure(err) => err.is_transient(),
            _ => false,
        }
    }
}
