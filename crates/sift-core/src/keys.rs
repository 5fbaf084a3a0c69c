//! Identity types: the normalized sub-question key and the candidate dedup key.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Key used when a sub-question has no text.
pub const UNTITLED_SUBQUESTION: &str = "Untitled subquestion";

const DOI_PREFIXES: [&str; 5] = [
    "https://doi.org/",
    "http://doi.org/",
    "https://dx.doi.org/",
    "http://dx.doi.org/",
    "doi:",
];

/// Normalized identity of a sub-question.
///
/// Produced once when the strategy is generated and carried everywhere else,
/// so incidental whitespace differences never split one sub-question in two.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct SubquestionKey(String);

impl SubquestionKey {
    /// `trim(text)`, or [`UNTITLED_SUBQUESTION`] when nothing is left.
    #[must_use]
    pub fn normalize(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            Self(UNTITLED_SUBQUESTION.to_string())
        } else {
            Self(trimmed.to_string())
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubquestionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Uniqueness boundary for persisted candidates within a project.
///
/// `doi:<doi>` when the record carries a DOI, otherwise
/// `title:<sha256(title|year)>`.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct DedupKey(String);

impl DedupKey {
    /// Derive the key from a record's identifying fields.
    ///
    /// Returns `None` when neither a DOI nor a non-blank title is available.
    #[must_use]
    pub fn derive(doi: Option<&str>, title: &str, year: Option<i32>) -> Option<Self> {
        if let Some(doi) = doi.and_then(normalize_doi) {
            return Some(Self(format!("doi:{doi}")));
        }

        let title = normalize_title(title);
        if title.is_empty() {
            return None;
        }

        let mut hasher = Sha256::new();
        hasher.update(title.as_bytes());
        hasher.update(b"|");
        if let Some(year) = year {
            hasher.update(year.to_string().as_bytes());
        }
        Some(Self(format!("title:{}", hex::encode(hasher.finalize()))))
    }

    /// Wrap an already-derived key (e.g., read back from storage).
    #[must_use]
    pub const fn from_stored(value: String) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DedupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lower-case a DOI and strip resolver prefixes. `None` if blank.
#[must_use]
pub fn normalize_doi(doi: &str) -> Option<String> {
    let mut doi = doi.trim().to_lowercase();
    for prefix in DOI_PREFIXES {
        if let Some(rest) = doi.strip_prefix(prefix) {
            doi = rest.trim().to_string();
            break;
        }
    }
    if doi.is_empty() { None } else { Some(doi) }
}

fn normalize_title(title: &str) -> String {
    title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("  Does X reduce Y?  ", "Does X reduce Y?")]
    #[case("", UNTITLED_SUBQUESTION)]
    #[case("   \t", UNTITLED_SUBQUESTION)]
    fn normalize_subquestion(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(SubquestionKey::normalize(input).as_str(), expected);
    }

    #[test]
    fn subquestion_key_serializes_as_plain_string() {
        let key = SubquestionKey::normalize("A");
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"A\"");
    }

    #[rstest]
    #[case("10.1000/ABC", "doi:10.1000/abc")]
    #[case("https://doi.org/10.1000/abc", "doi:10.1000/abc")]
    #[case("doi:10.1000/Abc ", "doi:10.1000/abc")]
    fn doi_keys_are_normalized(#[case] doi: &str, #[case] expected: &str) {
        let key = DedupKey::derive(Some(doi), "ignored", Some(2020)).unwrap();
        assert_eq!(key.as_str(), expected);
    }

    #[test]
    fn title_key_ignores_case_and_spacing() {
        let a = DedupKey::derive(None, "Gamified  Learning", Some(2021)).unwrap();
        let b = DedupKey::derive(Some("  "), "gamified learning", Some(2021)).unwrap();
        assert_eq!(a, b);
        assert!(a.as_str().starts_with("title:"));
    }

    #[test]
    fn title_key_depends_on_year() {
        let a = DedupKey::derive(None, "Same title", Some(2021)).unwrap();
        let b = DedupKey::derive(None, "Same title", Some(2022)).unwrap();
        let c = DedupKey::derive(None, "Same title", None).unwrap();
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn no_identity_yields_none() {
        assert!(DedupKey::derive(None, "   ", Some(2020)).is_none());
        assert!(DedupKey::derive(Some(""), "", None).is_none());
    }
}
