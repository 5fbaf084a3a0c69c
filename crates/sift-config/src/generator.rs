//! Term generator (OpenAI-compatible chat completions) configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_base_url() -> String {
    "https://api.groq.com/openai/v1".into()
}

fn default_model() -> String {
    "llama-3.3-70b-versatile".into()
}

const fn default_timeout_secs() -> u64 {
    60
}

const fn default_temperature() -> f32 {
    0.2
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneratorConfig {
    /// Base URL of the chat-completions API (without `/chat/completions`).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token. When empty the offline template generator is used.
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
            temperature: default_temperature(),
        }
    }
}

impl GeneratorConfig {
    /// Whether a remote generator can be called.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty() && !self.base_url.is_empty()
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_not_configured() {
        let config = GeneratorConfig::default();
        assert!(!config.is_configured());
        assert_eq!(config.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn configured_when_key_set() {
        let config = GeneratorConfig {
            api_key: "gsk_test".into(),
            ..Default::default()
        };
        assert!(config.is_configured());
    }
}
