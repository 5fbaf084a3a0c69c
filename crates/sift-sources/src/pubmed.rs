//! PubMed client over NCBI E-utilities.
//!
//! Two round trips: `esearch` resolves the query to PMIDs, `esummary`
//! fetches document summaries for those ids. Summaries carry no abstract.

use std::collections::HashMap;

use sift_core::entities::ExternalRecord;
use sift_core::enums::SourceId;

use crate::{
    SourceClient,
    error::SourceError,
    http::check_response,
    text::{leading_year, non_blank},
};

const TOOL: &str = "sift";

#[derive(serde::Deserialize)]
struct ESearchResponse {
    esearchresult: ESearchResult,
}

#[derive(serde::Deserialize)]
struct ESearchResult {
    #[serde(default)]
    idlist: Vec<String>,
}

#[derive(serde::Deserialize)]
struct ESummaryResponse {
    result: ESummaryResult,
}

/// `result` holds `uids` plus one object per uid keyed by the uid itself.
#[derive(serde::Deserialize)]
struct ESummaryResult {
    #[serde(default)]
    uids: Vec<String>,
    #[serde(flatten)]
    docs: HashMap<String, serde_json::Value>,
}

#[derive(serde::Deserialize)]
struct DocSummary {
    uid: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    pubdate: String,
    #[serde(default)]
    authors: Vec<DocAuthor>,
    #[serde(default)]
    articleids: Vec<ArticleId>,
}

#[derive(serde::Deserialize)]
struct DocAuthor {
    name: String,
}

#[derive(serde::Deserialize)]
struct ArticleId {
    idtype: String,
    value: String,
}

impl DocSummary {
    fn into_record(self) -> ExternalRecord {
        let doi = self
            .articleids
            .into_iter()
            .find(|id| id.idtype.eq_ignore_ascii_case("doi"))
            .map(|id| id.value);
        ExternalRecord {
            url: format!("https://pubmed.ncbi.nlm.nih.gov/{}/", self.uid),
            external_id: self.uid,
            source: SourceId::PubMed,
            title: self.title.trim().trim_end_matches('.').to_string(),
            authors: self.authors.into_iter().map(|a| a.name).collect(),
            year: leading_year(&self.pubdate),
            abstract_text: String::new(),
            doi: non_blank(doi),
            is_open_access: false,
            citation_count: None,
        }
    }
}

impl ESummaryResult {
    /// Summaries in `uids` order; entries that fail to parse are skipped.
    fn into_records(mut self) -> Vec<ExternalRecord> {
        self.uids
            .iter()
            .filter_map(|uid| self.docs.remove(uid))
            .filter_map(|value| match serde_json::from_value::<DocSummary>(value) {
                Ok(doc) => Some(doc.into_record()),
                Err(e) => {
                    tracing::warn!(%e, "skipping unparseable pubmed summary");
                    None
                }
            })
            .collect()
    }
}

impl SourceClient {
    /// Search PubMed and return summaries for the top `limit` PMIDs.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if either E-utilities request fails, returns
    /// a non-success status, or cannot be parsed.
    pub async fn search_pubmed(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<ExternalRecord>, SourceError> {
        let base = self.config.pubmed_url.trim_end_matches('/');
        let contact = self.eutils_contact();

        let url = format!(
            "{base}/esearch.fcgi?db=pubmed&retmode=json&retmax={limit}&term={}{contact}",
            urlencoding::encode(query)
        );
        let resp = check_response(self.http.get(&url).send().await?).await?;
        let search: ESearchResponse = resp.json().await?;

        let ids = search.esearchresult.idlist;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!(
            "{base}/esummary.fcgi?db=pubmed&retmode=json&id={}{contact}",
            ids.join(",")
        );
        let resp = check_response(self.http.get(&url).send().await?).await?;
        let summary: ESummaryResponse = resp.json().await?;
        Ok(summary.result.into_records())
    }

    /// `&tool=..&email=..` query suffix recommended by NCBI.
    fn eutils_contact(&self) -> String {
        if self.config.has_contact_email() {
            format!(
                "&tool={TOOL}&email={}",
                urlencoding::encode(&self.config.contact_email)
            )
        } else {
            format!("&tool={TOOL}")
        }
    }
}
