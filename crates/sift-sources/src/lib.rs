//! # sift-sources
//!
//! Bibliographic source HTTP clients for sift.
//!
//! Each source maps its native response into [`ExternalRecord`]s:
//! - Semantic Scholar Graph API
//! - PubMed via NCBI E-utilities (`esearch` + `esummary`)
//! - Crossref REST API
//! - Europe PMC REST API

pub mod crossref;
pub mod europe_pmc;
pub mod pubmed;
pub mod semantic_scholar;

mod error;
mod http;
mod text;

pub use error::SourceError;
pub use http::truncate_error_body;

use sift_config::SourcesConfig;
use sift_core::entities::ExternalRecord;
use sift_core::enums::SourceId;
use std::future::Future;

// ── Seam ───────────────────────────────────────────────────────────

/// Anything that can answer a query against a named source.
///
/// [`SourceClient`] is the HTTP implementation; tests substitute fakes.
pub trait RecordSource: Send + Sync {
    fn query(
        &self,
        source: SourceId,
        query: &str,
    ) -> impl Future<Output = Result<Vec<ExternalRecord>, SourceError>> + Send;
}

// ── Client ─────────────────────────────────────────────────────────

/// HTTP client for the supported bibliographic sources.
pub struct SourceClient {
    http: reqwest::Client,
    config: SourcesConfig,
}

impl SourceClient {
    /// Build a client from the `[sources]` config section.
    ///
    /// The reqwest timeout is the configured per-source timeout; callers may
    /// additionally bound each query themselves.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the underlying `reqwest::Client`
    /// fails to build.
    pub fn new(config: SourcesConfig) -> Result<Self, SourceError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("sift/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout())
            .build()?;
        Ok(Self { http, config })
    }

    #[must_use]
    pub const fn config(&self) -> &SourcesConfig {
        &self.config
    }

    fn limit(&self) -> u32 {
        self.config.per_source_limit
    }

    /// Search one source.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the HTTP request fails, the source
    /// returns a non-success status, or the response cannot be parsed.
    pub async fn search(
        &self,
        source: SourceId,
        query: &str,
    ) -> Result<Vec<ExternalRecord>, SourceError> {
        let limit = self.limit();
        let records = match source {
            SourceId::SemanticScholar => self.search_semantic_scholar(query, limit).await,
            SourceId::PubMed => self.search_pubmed(query, limit).await,
            SourceId::CrossRef => self.search_crossref(query, limit).await,
            SourceId::EuropePmc => self.search_europe_pmc(query, limit).await,
        }?;
        tracing::debug!(source = %source, count = records.len(), "source search complete");
        Ok(records)
    }
}

impl RecordSource for SourceClient {
    async fn query(&self, source: SourceId, query: &str) -> Result<Vec<ExternalRecord>, SourceError> {
        self.search(source, query).await
    }
}
