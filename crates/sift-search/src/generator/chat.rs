//! OpenAI-compatible chat-completions term generator (Groq by default).

use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use sift_config::GeneratorConfig;
use sift_core::entities::Protocol;
use sift_core::enums::SourceId;
use sift_sources::truncate_error_body;

use super::{
    BlocksRequest, GeneratedBlocks, GeneratedMatrix, GeneratorError, MatrixRequest, TermGenerator,
};

const SYSTEM_PROMPT: &str = "You design literature search strategies for systematic reviews. \
Answer with a single JSON object and nothing else.";

/// Term generator backed by a chat-completions endpoint.
pub struct ChatTermGenerator {
    http: reqwest::Client,
    config: GeneratorConfig,
}

impl ChatTermGenerator {
    /// # Errors
    ///
    /// Returns [`GeneratorError::Http`] if the HTTP client fails to build.
    pub fn new(config: GeneratorConfig) -> Result<Self, GeneratorError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("sift/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout())
            .build()?;
        Ok(Self { http, config })
    }

    fn request_body(&self, prompt: &str) -> Value {
        json!({
            "model": self.config.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": prompt},
            ],
            "temperature": self.config.temperature,
            "response_format": {"type": "json_object"},
            "stream": false,
        })
    }

    async fn complete<T: DeserializeOwned>(&self, prompt: &str) -> Result<T, GeneratorError> {
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        tracing::debug!(%url, model = %self.config.model, "sending generator request");

        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&self.request_body(prompt))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(GeneratorError::Api {
                status: status.as_u16(),
                message: truncate_error_body(body),
            });
        }

        let body: Value = serde_json::from_str(&body)
            .map_err(|e| GeneratorError::Parse(format!("invalid response JSON: {e}")))?;
        parse_payload(message_content(&body)?)
    }
}

impl TermGenerator for ChatTermGenerator {
    async fn concept_matrix(&self, request: &MatrixRequest) -> Result<GeneratedMatrix, GeneratorError> {
        self.complete(&matrix_prompt(&request.protocol)).await
    }

    async fn subquestion_blocks(
        &self,
        request: &BlocksRequest,
    ) -> Result<GeneratedBlocks, GeneratorError> {
        self.complete(&blocks_prompt(request)).await
    }
}

/// `choices[0].message.content` of a chat-completions response.
fn message_content(body: &Value) -> Result<&str, GeneratorError> {
    body.get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(Value::as_str)
        .ok_or_else(|| GeneratorError::Parse("no choices in response".into()))
}

/// Parse the JSON object in a model reply, tolerating code fences and prose
/// around it.
fn parse_payload<T: DeserializeOwned>(content: &str) -> Result<T, GeneratorError> {
    let start = content.find('{');
    let end = content.rfind('}');
    let json = match (start, end) {
        (Some(start), Some(end)) if start < end => &content[start..=end],
        _ => return Err(GeneratorError::Parse("reply contains no JSON object".into())),
    };
    serde_json::from_str(json).map_err(|e| GeneratorError::Parse(e.to_string()))
}

fn protocol_lines(protocol: &Protocol) -> String {
    let pico = &protocol.pico;
    format!(
        "Main question: {}\nPopulation: {}\nIntervention: {}\nComparison: {}\nOutcome: {}",
        protocol.display_question(),
        pico.population,
        pico.intervention,
        pico.comparison,
        pico.outcome
    )
}

fn matrix_prompt(protocol: &Protocol) -> String {
    format!(
        "{}\n\nBuild a concept matrix for this question. Return \
         {{\"question\": string, \"concepts\": [{{\"component\": \"population\"|\"intervention\"|\"comparison\"|\"outcome\", \
         \"concept\": string, \"terms\": [string]}}], \"recommendations\": [string]}}. \
         List synonyms and controlled-vocabulary terms for each concept.",
        protocol_lines(protocol)
    )
}

fn blocks_prompt(request: &BlocksRequest) -> String {
    let matrix = request
        .concept_matrix
        .iter()
        .map(|concept| {
            format!(
                "- {} ({}): {}",
                concept.concept,
                concept.component,
                concept.terms.join("; ")
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    let subquestions = request
        .protocol
        .subquestions
        .iter()
        .enumerate()
        .map(|(i, text)| format!("{}. {text}", i + 1))
        .collect::<Vec<_>>()
        .join("\n");
    let sources = request
        .sources
        .iter()
        .map(|source: &SourceId| source.label())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "{}\n\nConcept matrix:\n{matrix}\n\nSub-questions:\n{subquestions}\n\n\
         For every sub-question return keywords and one boolean query per database ({sources}). Return \
         {{\"question\": string, \"blocks\": [{{\"subquestion\": string, \"keywords\": [string], \
         \"per_source_query\": [{{\"source\": string, \"query\": string, \"filters\": string, \
         \"estimated_results\": string}}]}}], \"recommendations\": [string]}}.",
        protocol_lines(&request.protocol)
    )
}
