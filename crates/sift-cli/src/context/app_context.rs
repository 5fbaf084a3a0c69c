use std::path::PathBuf;

use anyhow::Context;
use sift_config::SiftConfig;
use sift_search::{ConfiguredGenerator, Phase2Service};
use sift_sources::SourceClient;
use sift_store::StoreService;

pub type Service = Phase2Service<ConfiguredGenerator, SourceClient>;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub service: Service,
    pub config: SiftConfig,
    pub project_root: PathBuf,
    review_id: Option<String>,
}

impl AppContext {
    /// Open the store under `project_root` and wire the service.
    ///
    /// The active review is `review_override` when given (and must exist),
    /// otherwise the most recently created review, if any.
    pub async fn init(
        project_root: PathBuf,
        config: SiftConfig,
        review_override: Option<&str>,
    ) -> anyhow::Result<Self> {
        let service = open_service(&project_root, &config).await?;

        let review_id = match review_override {
            Some(id) => {
                service
                    .project(id)
                    .await
                    .with_context(|| format!("unknown review '{id}'"))?;
                Some(id.to_string())
            }
            None => service
                .store()
                .latest_project()
                .await
                .context("failed to look up the latest review")?
                .map(|project| project.id),
        };

        tracing::debug!(
            root = %project_root.display(),
            review = review_id.as_deref().unwrap_or("-"),
            generator = service.generator().name(),
            "application context ready"
        );

        Ok(Self {
            service,
            config,
            project_root,
            review_id,
        })
    }

    /// Id of the active review.
    pub fn review_id(&self) -> anyhow::Result<&str> {
        self.review_id
            .as_deref()
            .context("no review in this project. Run 'sift init' first.")
    }
}

/// Build the phase-2 service for a project root.
pub async fn open_service(
    project_root: &std::path::Path,
    config: &SiftConfig,
) -> anyhow::Result<Service> {
    let db_path = config.store.resolve(project_root);
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let store = StoreService::new_local(&db_path.to_string_lossy())
        .await
        .context("failed to open sift store")?;
    let generator = ConfiguredGenerator::from_config(&config.generator)
        .context("failed to initialize term generator")?;
    let source =
        SourceClient::new(config.sources.clone()).context("failed to initialize source client")?;

    Ok(Phase2Service::new(
        store,
        generator,
        source,
        config.sources.timeout(),
    ))
}
