use serde_json::json;
use sift_core::responses::SearchOutcome;

use crate::cli::root_commands::SearchArgs;
use crate::cli::{GlobalFlags, OutputFormat};
use crate::context::AppContext;
use crate::output::output;
use crate::progress::Progress;
use crate::search_lock;

/// Handle `sift search`.
pub async fn handle(args: &SearchArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let review_id = ctx.review_id()?;
    let key = ctx.service.resolve_key(review_id, &args.subquestion).await?;
    let _lock = search_lock::acquire_for_key(&ctx.project_root, review_id, &key)?;

    let progress = Progress::spinner(&format!("Searching \"{key}\""));
    let outcome = match ctx.service.search_subquestion(review_id, &key).await {
        Ok(outcome) => outcome,
        Err(error) => {
            progress.finish_err("Search failed; nothing was recorded");
            return Err(error.into());
        }
    };
    progress.finish_ok(&outcome.status_message);

    for report in outcome.source_reports.iter().filter(|report| !report.is_ok()) {
        tracing::warn!(
            source = %report.source,
            status = ?report.status,
            error = report.error.as_deref().unwrap_or(""),
            "source did not return results"
        );
    }

    if flags.format == OutputFormat::Table {
        return output(&record_rows(&outcome), flags.format);
    }
    output(&outcome, flags.format)
}

fn record_rows(outcome: &SearchOutcome) -> Vec<serde_json::Value> {
    outcome
        .records
        .iter()
        .map(|record| {
            json!({
                "id": record.external_id,
                "source": record.source.label(),
                "year": record.year,
                "title": record.title,
            })
        })
        .collect()
}
