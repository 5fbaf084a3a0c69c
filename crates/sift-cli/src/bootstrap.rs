use std::path::Path;

use anyhow::Context;
use sift_config::SiftConfig;

/// Load layered config for the project at `project_root`, reading its
/// `.env` first.
pub fn load_config(project_root: &Path) -> anyhow::Result<SiftConfig> {
    SiftConfig::load_for_project(project_root).with_context(|| {
        format!(
            "failed to load sift configuration for {}",
            project_root.display()
        )
    })
}
