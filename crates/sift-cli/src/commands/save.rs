use anyhow::Context;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::SaveArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `sift save`.
pub async fn handle(args: &SaveArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let review_id = ctx.review_id()?;
    let ids = if args.all {
        ctx.service
            .current_results(review_id)
            .await?
            .context("no search results to save. Run 'sift search' first.")?
            .records
            .into_iter()
            .map(|record| record.external_id)
            .collect()
    } else {
        args.ids.clone()
    };

    let outcome = ctx.service.save_selected(review_id, &ids).await?;
    if outcome.replayed {
        tracing::info!(subquestion = %outcome.subquestion_key, "save already recorded; nothing written");
    }
    output(&outcome, flags.format)
}
