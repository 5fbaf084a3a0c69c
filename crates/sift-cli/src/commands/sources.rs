use serde_json::json;
use sift_core::enums::SourceId;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::SourceCommands;
use crate::commands::shared::parse::parse_sources;
use crate::context::AppContext;
use crate::output::output;

/// Handle `sift sources`.
pub async fn handle(
    action: &SourceCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let review_id = ctx.review_id()?;
    let selected = match action {
        SourceCommands::List => ctx.service.state(review_id).await?.selected_sources,
        SourceCommands::Set { sources } => {
            let sources = parse_sources(sources)?;
            if sources.is_empty() {
                tracing::warn!("no sources selected; searches will be rejected until one is");
            }
            ctx.service
                .select_sources(review_id, &sources)
                .await?
                .selected_sources
        }
    };

    let rows = SourceId::ALL
        .iter()
        .map(|source| {
            json!({
                "source": source,
                "label": source.label(),
                "selected": selected.contains(source),
                "default": ctx.config.search.default_sources.contains(source),
            })
        })
        .collect::<Vec<_>>();
    output(&rows, flags.format)
}
