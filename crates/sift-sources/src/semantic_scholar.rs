//! Semantic Scholar Graph API client.

use sift_core::entities::ExternalRecord;
use sift_core::enums::SourceId;

use crate::{SourceClient, error::SourceError, http::check_response, text::non_blank};

const FIELDS: &str =
    "paperId,title,abstract,year,authors,externalIds,url,isOpenAccess,citationCount";

/// Graph API caps `limit` at 100 for relevance search.
const MAX_LIMIT: u32 = 100;

#[derive(serde::Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<Paper>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct Paper {
    paper_id: String,
    title: Option<String>,
    #[serde(rename = "abstract")]
    abstract_text: Option<String>,
    year: Option<i32>,
    #[serde(default)]
    authors: Vec<Author>,
    external_ids: Option<ExternalIds>,
    url: Option<String>,
    #[serde(default)]
    is_open_access: bool,
    citation_count: Option<u64>,
}

#[derive(serde::Deserialize)]
struct Author {
    name: Option<String>,
}

#[derive(serde::Deserialize)]
struct ExternalIds {
    #[serde(rename = "DOI")]
    doi: Option<String>,
}

impl Paper {
    fn into_record(self) -> ExternalRecord {
        let url = self
            .url
            .unwrap_or_else(|| format!("https://www.semanticscholar.org/paper/{}", self.paper_id));
        ExternalRecord {
            external_id: self.paper_id,
            source: SourceId::SemanticScholar,
            title: self.title.unwrap_or_default().trim().to_string(),
            authors: self.authors.into_iter().filter_map(|a| a.name).collect(),
            year: self.year,
            abstract_text: self.abstract_text.unwrap_or_default().trim().to_string(),
            doi: non_blank(self.external_ids.and_then(|ids| ids.doi)),
            url,
            is_open_access: self.is_open_access,
            citation_count: self.citation_count,
        }
    }
}

impl SourceClient {
    /// Relevance search against the Semantic Scholar Graph API.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the HTTP request fails, the API returns a
    /// non-success status, or the response cannot be parsed.
    pub async fn search_semantic_scholar(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<ExternalRecord>, SourceError> {
        let limit = limit.min(MAX_LIMIT);
        let url = format!(
            "{}/paper/search?query={}&limit={limit}&fields={FIELDS}",
            self.config.semantic_scholar_url.trim_end_matches('/'),
            urlencoding::encode(query)
        );

        let mut request = self.http.get(&url);
        if self.config.has_semantic_scholar_key() {
            request = request.header("x-api-key", &self.config.semantic_scholar_api_key);
        }
        let resp = check_response(request.send().await?).await?;

        let data: SearchResponse = resp.json().await?;
        Ok(data.data.into_iter().map(Paper::into_record).collect())
    }
}
