use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::PicoComponent;
use crate::keys::SubquestionKey;

/// One row of the derived term matrix.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ConceptTerm {
    pub component: PicoComponent,
    pub concept: String,
    /// Synonyms in presentation order.
    pub terms: Vec<String>,
}

/// A generated query string for one named database.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SourceQuery {
    /// Free-form database name as written by the generator (e.g. `"PubMed"`).
    pub source: String,
    pub query: String,
    #[serde(default)]
    pub filters: Option<String>,
    #[serde(default)]
    pub estimated_results: Option<String>,
}

/// Keywords and per-source queries for one sub-question.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SubquestionBlock {
    pub key: SubquestionKey,
    pub subquestion: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub per_source_query: Vec<SourceQuery>,
}

/// Root artifact of strategy generation. Replaced wholesale on regeneration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Strategy {
    pub question: String,
    #[serde(default)]
    pub concept_matrix: Vec<ConceptTerm>,
    #[serde(default)]
    pub subquestion_blocks: Vec<SubquestionBlock>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

impl Strategy {
    /// Keys of all sub-question blocks, in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &SubquestionKey> {
        self.subquestion_blocks.iter().map(|block| &block.key)
    }

    #[must_use]
    pub fn block(&self, key: &SubquestionKey) -> Option<&SubquestionBlock> {
        self.subquestion_blocks.iter().find(|block| &block.key == key)
    }

    #[must_use]
    pub fn contains(&self, key: &SubquestionKey) -> bool {
        self.block(key).is_some()
    }
}
