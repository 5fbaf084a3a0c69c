//! Crossref REST API client.

use sift_core::entities::ExternalRecord;
use sift_core::enums::SourceId;

use crate::{
    SourceClient,
    error::SourceError,
    http::check_response,
    text::{non_blank, strip_markup},
};

/// Crossref caps `rows` at 1000; keep requests modest.
const MAX_ROWS: u32 = 100;

#[derive(serde::Deserialize)]
struct WorksResponse {
    message: WorksMessage,
}

#[derive(serde::Deserialize)]
struct WorksMessage {
    #[serde(default)]
    items: Vec<Work>,
}

#[derive(serde::Deserialize)]
struct Work {
    #[serde(rename = "DOI")]
    doi: String,
    #[serde(default)]
    title: Vec<String>,
    #[serde(default)]
    author: Vec<WorkAuthor>,
    issued: Option<DateParts>,
    published: Option<DateParts>,
    #[serde(rename = "abstract")]
    abstract_text: Option<String>,
    #[serde(rename = "URL")]
    url: Option<String>,
    #[serde(rename = "is-referenced-by-count")]
    referenced_by: Option<u64>,
    #[serde(default)]
    license: Vec<serde_json::Value>,
}

#[derive(serde::Deserialize)]
struct WorkAuthor {
    given: Option<String>,
    family: Option<String>,
    name: Option<String>,
}

#[derive(serde::Deserialize)]
struct DateParts {
    #[serde(rename = "date-parts", default)]
    date_parts: Vec<Vec<Option<i32>>>,
}

impl DateParts {
    fn year(&self) -> Option<i32> {
        self.date_parts.first()?.first().copied().flatten()
    }
}

impl WorkAuthor {
    fn display_name(self) -> Option<String> {
        match (self.given, self.family, self.name) {
            (Some(given), Some(family), _) => Some(format!("{given} {family}")),
            (None, Some(family), _) => Some(family),
            (_, None, name) => name,
        }
    }
}

impl Work {
    fn into_record(self) -> ExternalRecord {
        let year = self
            .issued
            .as_ref()
            .and_then(DateParts::year)
            .or_else(|| self.published.as_ref().and_then(DateParts::year));
        let url = self
            .url
            .unwrap_or_else(|| format!("https://doi.org/{}", self.doi));
        ExternalRecord {
            external_id: self.doi.clone(),
            source: SourceId::CrossRef,
            title: self.title.into_iter().next().unwrap_or_default().trim().to_string(),
            authors: self
                .author
                .into_iter()
                .filter_map(WorkAuthor::display_name)
                .collect(),
            year,
            abstract_text: self
                .abstract_text
                .as_deref()
                .map(strip_markup)
                .unwrap_or_default(),
            doi: non_blank(Some(self.doi)),
            url,
            is_open_access: !self.license.is_empty(),
            citation_count: self.referenced_by,
        }
    }
}

impl SourceClient {
    /// Bibliographic query against Crossref `/works`.
    ///
    /// Sends `mailto` when a contact email is configured (polite pool).
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the HTTP request fails, the API returns a
    /// non-success status, or the response cannot be parsed.
    pub async fn search_crossref(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<ExternalRecord>, SourceError> {
        let rows = limit.min(MAX_ROWS);
        let mut url = format!(
            "{}/works?query.bibliographic={}&rows={rows}",
            self.config.crossref_url.trim_end_matches('/'),
            urlencoding::encode(query)
        );
        if self.config.has_contact_email() {
            url.push_str("&mailto=");
            url.push_str(&urlencoding::encode(&self.config.contact_email));
        }

        let resp = check_response(self.http.get(&url).send().await?).await?;
        let data: WorksResponse = resp.json().await?;
        Ok(data.message.items.into_iter().map(Work::into_record).collect())
    }
}
