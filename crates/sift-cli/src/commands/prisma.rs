use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

/// Handle `sift prisma`.
pub async fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let review_id = ctx.review_id()?;
    let counts = ctx.service.prisma(review_id).await?;
    output(&counts, flags.format)
}
