use serde_json::json;
use sift_core::enums::ScreeningStatus;

use crate::cli::root_commands::CandidatesArgs;
use crate::cli::{GlobalFlags, OutputFormat};
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

/// Handle `sift candidates`.
pub async fn handle(
    args: &CandidatesArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let review_id = ctx.review_id()?;
    let status = args
        .status
        .as_deref()
        .map(|raw| parse_enum::<ScreeningStatus>(raw, "status"))
        .transpose()?;

    let mut candidates = ctx.service.candidates(review_id, status).await?;
    candidates.truncate(effective_limit(flags.limit, 50));

    if flags.format == OutputFormat::Table {
        let rows = candidates
            .iter()
            .map(|candidate| {
                json!({
                    "dedup_key": candidate.dedup_key,
                    "status": candidate.screening_status,
                    "year": candidate.record.year,
                    "title": candidate.record.title,
                })
            })
            .collect::<Vec<_>>();
        return output(&rows, flags.format);
    }
    output(&candidates, flags.format)
}
