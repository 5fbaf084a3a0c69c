use serde_json::json;

use crate::cli::{GlobalFlags, OutputFormat};
use crate::context::AppContext;
use crate::output::output;

/// Handle `sift state`.
pub async fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let review_id = ctx.review_id()?;
    let summary = ctx.service.summary(review_id).await?;

    if flags.format == OutputFormat::Table {
        let rows = summary
            .subquestions
            .iter()
            .enumerate()
            .map(|(index, status)| {
                json!({
                    "#": index + 1,
                    "subquestion": status.key,
                    "phase": status.phase,
                    "hidden": status.hidden,
                    "results": status.total_results,
                    "saved": status.saved_count,
                })
            })
            .collect::<Vec<_>>();
        return output(&rows, flags.format);
    }
    output(&summary, flags.format)
}
