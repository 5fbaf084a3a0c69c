use serde_json::json;

use crate::cli::{GlobalFlags, OutputFormat};
use crate::commands::shared::limit::effective_limit;
use crate::context::AppContext;
use crate::output::output;

/// Handle `sift results`.
pub async fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let review_id = ctx.review_id()?;
    let Some(mut results) = ctx.service.current_results(review_id).await? else {
        return output(&serde_json::Value::Null, flags.format);
    };
    results.records.truncate(effective_limit(flags.limit, 100));

    if flags.format == OutputFormat::Table {
        let rows = results
            .records
            .iter()
            .map(|record| {
                json!({
                    "id": record.external_id,
                    "source": record.source.label(),
                    "year": record.year,
                    "doi": record.doi,
                    "title": record.title,
                })
            })
            .collect::<Vec<_>>();
        return output(&rows, flags.format);
    }
    output(&results, flags.format)
}
