use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::HideArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `sift hide`.
pub async fn handle(args: &HideArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let review_id = ctx.review_id()?;
    let key = ctx.service.resolve_key(review_id, &args.subquestion).await?;
    let state = ctx.service.hide_subquestion(review_id, &key).await?;
    output(
        &json!({
            "hidden": key,
            "visible": state.visible_keys(),
            "all_done": state.all_done(),
        }),
        flags.format,
    )
}
