use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::AdminCommands;
use crate::context::AppContext;
use crate::output::output;

/// Handle `sift admin`.
pub async fn handle(
    action: &AdminCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let review_id = ctx.review_id()?;
    match action {
        AdminCommands::Unlock { subquestion } => {
            let key = ctx.service.resolve_key(review_id, subquestion).await?;
            let state = ctx.service.unlock_subquestion(review_id, &key).await?;
            output(
                &json!({
                    "unlocked": key,
                    "phase": state.phase_of(&key),
                    "documentation_cleared": state.documentation_text.is_none(),
                }),
                flags.format,
            )
        }
    }
}
