//! Term generation: the two-step contract behind strategy derivation.
//!
//! Step one turns the protocol into a concept matrix (PICO component,
//! concept, synonyms). Step two turns the matrix and the protocol's
//! sub-questions into keyword blocks with one query per source.
//!
//! Generators return raw output; [`shaping`] normalizes it and decides when
//! it is unusable.

mod chat;
pub mod shaping;
mod template;

pub use chat::ChatTermGenerator;
pub use template::TemplateTermGenerator;

use serde::{Deserialize, Serialize};
use sift_config::GeneratorConfig;
use sift_core::entities::{ConceptTerm, Protocol, SourceQuery};
use sift_core::enums::SourceId;
use std::future::Future;

/// Errors from a term generator.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("generator API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("could not parse generator output: {0}")]
    Parse(String),

    /// The output parsed but nothing usable was left after shaping.
    #[error("generator returned nothing usable: {0}")]
    Empty(String),
}

impl GeneratorError {
    /// Network failures, rate limits, and server errors.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(_) => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::Parse(_) | Self::Empty(_) => false,
        }
    }
}

/// Input to step one.
#[derive(Debug, Clone)]
pub struct MatrixRequest {
    pub protocol: Protocol,
}

/// Input to step two.
#[derive(Debug, Clone)]
pub struct BlocksRequest {
    pub protocol: Protocol,
    pub concept_matrix: Vec<ConceptTerm>,
    pub sources: Vec<SourceId>,
}

/// Raw step-one output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedMatrix {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub concepts: Vec<ConceptTerm>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

/// One raw sub-question block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedBlock {
    #[serde(default)]
    pub subquestion: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub per_source_query: Vec<SourceQuery>,
}

/// Raw step-two output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedBlocks {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub blocks: Vec<GeneratedBlock>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

/// Producer of search terms.
///
/// [`ChatTermGenerator`] calls a remote model; [`TemplateTermGenerator`]
/// derives terms offline from the protocol fields.
pub trait TermGenerator: Send + Sync {
    fn concept_matrix(
        &self,
        request: &MatrixRequest,
    ) -> impl Future<Output = Result<GeneratedMatrix, GeneratorError>> + Send;

    fn subquestion_blocks(
        &self,
        request: &BlocksRequest,
    ) -> impl Future<Output = Result<GeneratedBlocks, GeneratorError>> + Send;
}

/// The generator picked from configuration at startup.
pub enum ConfiguredGenerator {
    Chat(ChatTermGenerator),
    Template(TemplateTermGenerator),
}

impl ConfiguredGenerator {
    /// Remote chat generator when an API key is configured, otherwise the
    /// offline template generator.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::Http`] if the HTTP client fails to build.
    pub fn from_config(config: &GeneratorConfig) -> Result<Self, GeneratorError> {
        if config.is_configured() {
            tracing::debug!(model = %config.model, "using chat term generator");
            Ok(Self::Chat(ChatTermGenerator::new(config.clone())?))
        } else {
            tracing::debug!("no generator API key; using template term generator");
            Ok(Self::Template(TemplateTermGenerator))
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Chat(_) => "chat",
            Self::Template(_) => "template",
        }
    }
}

impl TermGenerator for ConfiguredGenerator {
    async fn concept_matrix(&self, request: &MatrixRequest) -> Result<GeneratedMatrix, GeneratorError> {
        match self {
            Self::Chat(generator) => generator.concept_matrix(request).await,
            Self::Template(generator) => generator.concept_matrix(request).await,
        }
    }

    async fn subquestion_blocks(
        &self,
        request: &BlocksRequest,
    ) -> Result<GeneratedBlocks, GeneratorError> {
        match self {
            Self::Chat(generator) => generator.subquestion_blocks(request).await,
            Self::Template(generator) => generator.subquestion_blocks(request).await,
        }
    }
}
