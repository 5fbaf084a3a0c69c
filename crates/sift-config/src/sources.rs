//! Bibliographic source client configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

const fn default_timeout_secs() -> u64 {
    20
}

const fn default_per_source_limit() -> u32 {
    25
}

fn default_semantic_scholar_url() -> String {
    "https://api.semanticscholar.org/graph/v1".into()
}

fn default_pubmed_url() -> String {
    "https://eutils.ncbi.nlm.nih.gov/entrez/eutils".into()
}

fn default_crossref_url() -> String {
    "https://api.crossref.org".into()
}

fn default_europe_pmc_url() -> String {
    "https://www.ebi.ac.uk/europepmc/webservices/rest".into()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourcesConfig {
    /// Upper bound for a single source query, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum records requested from each source per search.
    #[serde(default = "default_per_source_limit")]
    pub per_source_limit: u32,

    /// Contact address sent to Crossref (polite pool) and NCBI.
    #[serde(default)]
    pub contact_email: String,

    /// Optional Semantic Scholar API key (`x-api-key` header).
    #[serde(default)]
    pub semantic_scholar_api_key: String,

    #[serde(default = "default_semantic_scholar_url")]
    pub semantic_scholar_url: String,

    #[serde(default = "default_pubmed_url")]
    pub pubmed_url: String,

    #[serde(default = "default_crossref_url")]
    pub crossref_url: String,

    #[serde(default = "default_europe_pmc_url")]
    pub europe_pmc_url: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            per_source_limit: default_per_source_limit(),
            contact_email: String::new(),
            semantic_scholar_api_key: String::new(),
            semantic_scholar_url: default_semantic_scholar_url(),
            pubmed_url: default_pubmed_url(),
            crossref_url: default_crossref_url(),
            europe_pmc_url: default_europe_pmc_url(),
        }
    }
}

impl SourcesConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    #[must_use]
    pub fn has_contact_email(&self) -> bool {
        !self.contact_email.is_empty()
    }

    #[must_use]
    pub fn has_semantic_scholar_key(&self) -> bool {
        !self.semantic_scholar_api_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = SourcesConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(20));
        assert_eq!(config.per_source_limit, 25);
        assert!(!config.has_contact_email());
        assert!(!config.has_semantic_scholar_key());
        assert!(config.pubmed_url.starts_with("https://eutils.ncbi.nlm.nih.gov"));
    }
}
