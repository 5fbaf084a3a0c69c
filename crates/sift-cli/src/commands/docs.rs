use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output_text;

/// Handle `sift docs`. Table format prints the report itself.
pub async fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let review_id = ctx.review_id()?;
    let outcome = ctx.service.generate_documentation(review_id).await?;
    output_text(&outcome.text, &outcome, flags.format)
}
