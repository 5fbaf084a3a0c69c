//! # sift-config
//!
//! Layered configuration loading for sift using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`SIFT_*` prefix, `__` as separator)
//! 2. Project-level `.sift/config.toml`
//! 3. User-level `~/.config/sift/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `SIFT_SOURCES__TIMEOUT_SECS` -> `sources.timeout_secs`,
//! `SIFT_GENERATOR__API_KEY` -> `generator.api_key`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use sift_config::SiftConfig;
//!
//! let config = SiftConfig::load_with_dotenv().expect("config");
//! if !config.generator.is_configured() {
//!     println!("using the offline template generator");
//! }
//! ```

mod error;
mod generator;
mod search;
mod sources;
mod store;

pub use error::ConfigError;
pub use generator::GeneratorConfig;
pub use search::SearchConfig;
pub use sources::SourcesConfig;
pub use store::StoreConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory holding project-local state and config.
pub const PROJECT_DIR: &str = ".sift";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SiftConfig {
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

impl SiftConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` loading.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration after reading `.env` from the current directory.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Load configuration for the project rooted at `project_root`, reading
    /// its `.env` and `.sift/config.toml` instead of the current directory's.
    pub fn load_for_project(project_root: &Path) -> Result<Self, ConfigError> {
        let env_path = project_root.join(".env");
        if env_path.exists() {
            let _ = dotenvy::from_path(&env_path);
        }
        let config: Self = Self::figment_for(project_root).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment or layer extra providers.
    pub fn figment() -> Figment {
        Self::figment_for(Path::new(""))
    }

    /// Provider chain with the project-local layer read from `project_root`.
    pub fn figment_for(project_root: &Path) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        // Layer 2: Project-local config
        let local_path = project_root.join(PROJECT_DIR).join("config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed("SIFT_").split("__"))
    }

    /// Cross-field checks that serde defaults cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sources.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "sources.timeout_secs".into(),
                reason: "must be greater than zero".into(),
            });
        }
        if self.sources.per_source_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "sources.per_source_limit".into(),
                reason: "must be greater than zero".into(),
            });
        }
        self.search.validate()
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("sift").join("config.toml"))
    }
}
