use std::path::PathBuf;

use anyhow::Context;
use serde_json::json;

use crate::bootstrap;
use crate::cli::GlobalFlags;
use crate::cli::root_commands::InitArgs;
use crate::commands::shared::parse::parse_sources;
use crate::commands::shared::protocol_file::read_protocol;
use crate::context::open_service;
use crate::output::output;

/// Handle `sift init`: create `.sift/` and a new review from a protocol file.
pub async fn handle(args: &InitArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let root = match &flags.project {
        Some(path) => PathBuf::from(path),
        None => std::env::current_dir().context("failed to read current directory")?,
    };
    let sift_dir = root.join(sift_config::PROJECT_DIR);
    std::fs::create_dir_all(&sift_dir)
        .with_context(|| format!("failed to create {}", sift_dir.display()))?;

    let config = bootstrap::load_config(&root)?;
    let protocol = read_protocol(&PathBuf::from(&args.protocol))?;
    let sources = if args.sources.is_empty() {
        config.search.default_sources.clone()
    } else {
        parse_sources(&args.sources)?
    };

    let service = open_service(&root, &config).await?;
    let project = service
        .initialize_project(&args.name, &protocol, &sources, config.search.filters())
        .await?;

    output(
        &json!({
            "review": project,
            "root": root.display().to_string(),
            "selected_sources": sources,
            "generator": service.generator().name(),
        }),
        flags.format,
    )
}
