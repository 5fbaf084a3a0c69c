use sift_core::enums::ScreeningStatus;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ScreenArgs;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

/// Handle `sift screen`.
pub async fn handle(args: &ScreenArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let review_id = ctx.review_id()?;
    let status = parse_enum::<ScreeningStatus>(&args.status, "status")?;
    let candidate = ctx
        .service
        .screen_candidate(review_id, &args.dedup_key, status)
        .await?;
    output(&candidate, flags.format)
}
