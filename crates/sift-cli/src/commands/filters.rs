use crate::cli::GlobalFlags;
use crate::cli::subcommands::FilterCommands;
use crate::context::AppContext;
use crate::output::output;

/// Handle `sift filters`.
pub async fn handle(
    action: &FilterCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let review_id = ctx.review_id()?;
    let current = ctx.service.state(review_id).await?.filters;
    match action {
        FilterCommands::Show => output(&current, flags.format),
        FilterCommands::Set {
            from,
            to,
            hide_missing_year,
            enforce_year_range,
        } => {
            let mut filters = current;
            if let Some(from) = from {
                filters.year_range.from = *from;
            }
            if let Some(to) = to {
                filters.year_range.to = *to;
            }
            if let Some(hide) = hide_missing_year {
                filters.hide_missing_year = *hide;
            }
            if let Some(enforce) = enforce_year_range {
                filters.enforce_year_range = *enforce;
            }
            let next = ctx.service.set_filters(review_id, filters).await?;
            output(&next.filters, flags.format)
        }
    }
}
