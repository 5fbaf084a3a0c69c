//! Sources, PICO components, screening status, and the sub-question lifecycle.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`.
//! Lifecycle enums provide `allowed_next_states()` to enforce valid transitions
//! at the application layer.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;

// ---------------------------------------------------------------------------
// SourceId
// ---------------------------------------------------------------------------

/// A supported external bibliographic source.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum SourceId {
    SemanticScholar,
    #[serde(rename = "pubmed")]
    PubMed,
    #[serde(rename = "crossref")]
    CrossRef,
    EuropePmc,
}

impl SourceId {
    /// Every supported source, in canonical iteration order.
    pub const ALL: [Self; 4] = [
        Self::SemanticScholar,
        Self::PubMed,
        Self::CrossRef,
        Self::EuropePmc,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SemanticScholar => "semantic_scholar",
            Self::PubMed => "pubmed",
            Self::CrossRef => "crossref",
            Self::EuropePmc => "europe_pmc",
        }
    }

    /// Human-readable label. Also the needle used to match generated
    /// per-source queries against a source (case-insensitive substring).
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::SemanticScholar => "Semantic Scholar",
            Self::PubMed => "PubMed",
            Self::CrossRef => "CrossRef",
            Self::EuropePmc => "Europe PMC",
        }
    }

    /// Whether a free-form source name (as written by the term generator)
    /// refers to this source.
    #[must_use]
    pub fn matches_name(self, name: &str) -> bool {
        name.to_lowercase().contains(&self.label().to_lowercase())
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "semantic_scholar" | "semantic-scholar" | "semanticscholar" | "s2" => {
                Ok(Self::SemanticScholar)
            }
            "pubmed" | "pm" => Ok(Self::PubMed),
            "crossref" | "cr" => Ok(Self::CrossRef),
            "europe_pmc" | "europe-pmc" | "europepmc" | "epmc" => Ok(Self::EuropePmc),
            other => Err(CoreError::UnknownSource(other.to_string())),
        }
    }
}

/// Render a source list the way reports show it (`"PubMed, CrossRef"`).
#[must_use]
pub fn format_source_list(sources: &[SourceId]) -> String {
    if sources.is_empty() {
        return String::from("No sources recorded");
    }
    sources
        .iter()
        .map(|source| source.label())
        .collect::<Vec<_>>()
        .join(", ")
}

// ---------------------------------------------------------------------------
// PicoComponent
// ---------------------------------------------------------------------------

/// Component of the PICO research-question framework.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum PicoComponent {
    #[serde(alias = "P")]
    Population,
    #[serde(alias = "I")]
    Intervention,
    #[serde(alias = "C")]
    Comparison,
    #[serde(alias = "O")]
    Outcome,
}

impl PicoComponent {
    pub const ALL: [Self; 4] = [
        Self::Population,
        Self::Intervention,
        Self::Comparison,
        Self::Outcome,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Population => "population",
            Self::Intervention => "intervention",
            Self::Comparison => "comparison",
            Self::Outcome => "outcome",
        }
    }

    /// Single-letter code (`P`, `I`, `C`, `O`).
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Self::Population => 'P',
            Self::Intervention => 'I',
            Self::Comparison => 'C',
            Self::Outcome => 'O',
        }
    }
}

impl fmt::Display for PicoComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ScreeningStatus
// ---------------------------------------------------------------------------

/// Screening decision attached to a persisted candidate.
///
/// ```text
/// pending → included
///         → excluded
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScreeningStatus {
    Pending,
    Included,
    Excluded,
}

impl ScreeningStatus {
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Included, Self::Excluded],
            Self::Included | Self::Excluded => &[],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Included => "included",
            Self::Excluded => "excluded",
        }
    }
}

impl fmt::Display for ScreeningStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SubquestionPhase
// ---------------------------------------------------------------------------

/// Search lifecycle of a single sub-question.
///
/// ```text
/// unsearched → searching → searched → locked
///                        → unsearched (search failed)
/// searched   → searching (re-search)
/// ```
///
/// `Locked` is terminal for the normal flow. Hidden is orthogonal and tracked
/// separately on the aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SubquestionPhase {
    Unsearched,
    Searching,
    Searched,
    Locked,
}

impl SubquestionPhase {
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Unsearched => &[Self::Searching],
            Self::Searching => &[Self::Searched, Self::Unsearched],
            Self::Searched => &[Self::Searching, Self::Locked],
            Self::Locked => &[],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unsearched => "unsearched",
            Self::Searching => "searching",
            Self::Searched => "searched",
            Self::Locked => "locked",
        }
    }
}

impl fmt::Display for SubquestionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
