//! Errors raised while parsing core values from user input.
//!
//! Storage, source and generator failures have their own error types in
//! `sift-store`, `sift-sources` and `sift-search`.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// A source name that matches no supported bibliographic source.
    #[error("unknown source '{0}' (expected semantic_scholar, pubmed, crossref or europe_pmc)")]
    UnknownSource(String),
}
