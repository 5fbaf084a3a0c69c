use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// PICO breakdown of the main research question.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Pico {
    #[serde(default)]
    pub population: String,
    #[serde(default)]
    pub intervention: String,
    #[serde(default)]
    pub comparison: String,
    #[serde(default)]
    pub outcome: String,
}

/// Planning-phase output consumed by strategy generation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Protocol {
    #[serde(default)]
    pub project_name: String,
    #[serde(default)]
    pub main_question: String,
    #[serde(default)]
    pub subquestions: Vec<String>,
    #[serde(default)]
    pub pico: Pico,
}

impl Protocol {
    /// The question to show when the generator did not return one.
    #[must_use]
    pub fn display_question(&self) -> &str {
        if self.main_question.trim().is_empty() {
            &self.project_name
        } else {
            &self.main_question
        }
    }
}

/// A review project: the owner of one phase-2 aggregate and one candidate set.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub protocol: Protocol,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
