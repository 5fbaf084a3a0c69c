//! Europe PMC REST API client.

use sift_core::entities::ExternalRecord;
use sift_core::enums::SourceId;

use crate::{
    SourceClient,
    error::SourceError,
    http::check_response,
    text::{leading_year, non_blank, strip_markup},
};

/// Europe PMC caps `pageSize` at 1000.
const MAX_PAGE_SIZE: u32 = 100;

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    result_list: ResultList,
}

#[derive(serde::Deserialize)]
struct ResultList {
    #[serde(default)]
    result: Vec<Article>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct Article {
    id: String,
    #[serde(default)]
    source: String,
    doi: Option<String>,
    #[serde(default)]
    title: String,
    author_string: Option<String>,
    pub_year: Option<String>,
    abstract_text: Option<String>,
    is_open_access: Option<String>,
    cited_by_count: Option<u64>,
}

impl Article {
    fn into_record(self) -> ExternalRecord {
        let authors = self
            .author_string
            .as_deref()
            .map(|s| {
                s.trim_end_matches('.')
                    .split(", ")
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(ToString::to_string)
                    .collect()
            })
            .unwrap_or_default();
        ExternalRecord {
            url: format!("https://europepmc.org/article/{}/{}", self.source, self.id),
            external_id: format!("{}:{}", self.source, self.id),
            source: SourceId::EuropePmc,
            title: self.title.trim().trim_end_matches('.').to_string(),
            authors,
            year: self.pub_year.as_deref().and_then(leading_year),
            abstract_text: self
                .abstract_text
                .as_deref()
                .map(strip_markup)
                .unwrap_or_default(),
            doi: non_blank(self.doi),
            is_open_access: self.is_open_access.as_deref() == Some("Y"),
            citation_count: self.cited_by_count,
        }
    }
}

impl SourceClient {
    /// Search Europe PMC (core result type, so abstracts are included).
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the HTTP request fails, the API returns a
    /// non-success status, or the response cannot be parsed.
    pub async fn search_europe_pmc(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<ExternalRecord>, SourceError> {
        let page_size = limit.min(MAX_PAGE_SIZE);
        let url = format!(
            "{}/search?query={}&format=json&resultType=core&pageSize={page_size}",
            self.config.europe_pmc_url.trim_end_matches('/'),
            urlencoding::encode(query)
        );
        let resp = check_response(self.http.get(&url).send().await?).await?;
        let data: SearchResponse = resp.json().await?;
        Ok(data
            .result_list
            .result
            .into_iter()
            .map(Article::into_record)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const FIXTURE: &str = r#"{
        "version": "6.9",
        "hitCount": 2,
        "resultList": {
            "result": [
                {
                    "id": "38012345",
                    "source": "MED",
                    "pmid": "38012345",
                    "doi": "10.1186/s12909-023-1",
                    "title": "Serious games for clinical reasoning.",
                    "authorString": "Rivera A, Chen L.",
                    "pubYear": "2023",
                    "abstractText": "Background: <b>games</b> help.",
                    "isOpenAccess": "Y",
                    "citedByCount": 3
                },
                {
                    "id": "PPR12345",
                    "source": "PPR",
                    "title": "Preprint without year",
                    "isOpenAccess": "N"
                }
            ]
        }
    }"#;

    #[test]
    fn maps_articles_to_records() {
        let data: SearchResponse = serde_json::from_str(FIXTURE).unwrap();
        let records: Vec<ExternalRecord> = data
            .result_list
            .result
            .into_iter()
            .map(Article::into_record)
            .collect();

        let first = &records[0];
        assert_eq!(first.external_id, "MED:38012345");
        assert_eq!(first.title, "Serious games for clinical reasoning");
        assert_eq!(first.authors, vec!["Rivera A".to_string(), "Chen L".to_string()]);
        assert_eq!(first.year, Some(2023));
        assert_eq!(first.abstract_text, "Background: games help.");
        assert!(first.is_open_access);
        assert_eq!(first.url, "https://europepmc.org/article/MED/38012345");

        let second = &records[1];
        assert_eq!(second.year, None);
        assert!(second.authors.is_empty());
        assert!(!second.is_open_access);
    }
}
