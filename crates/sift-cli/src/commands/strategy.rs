use sift_core::responses::RegenerationOutcome;
use sift_search::Phase2Error;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::StrategyCommands;
use crate::context::AppContext;
use crate::output::output;
use crate::progress::Progress;

/// Handle `sift strategy`.
pub async fn handle(
    action: &StrategyCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let review_id = ctx.review_id()?;
    match action {
        StrategyCommands::Show => {
            let state = ctx.service.state(review_id).await?;
            output(&state.strategy, flags.format)
        }
        StrategyCommands::Derive { confirm } => {
            let progress = Progress::spinner("Deriving concept matrix");
            let result = ctx.service.generate_derivation(review_id, *confirm).await;
            let outcome = finish(&progress, result, "Concept matrix ready")?;
            output(&outcome, flags.format)
        }
        StrategyCommands::Subquestions { confirm } => {
            let progress = Progress::spinner("Deriving sub-question keywords and queries");
            let result = ctx
                .service
                .generate_subquestion_keywords(review_id, *confirm)
                .await;
            let outcome = finish(&progress, result, "Sub-question strategy ready")?;
            output(&outcome, flags.format)
        }
    }
}

fn finish(
    progress: &Progress,
    result: Result<RegenerationOutcome, Phase2Error>,
    done: &str,
) -> anyhow::Result<RegenerationOutcome> {
    match result {
        Ok(outcome) => {
            progress.finish_ok(done);
            if !outcome.orphaned_locks.is_empty() {
                tracing::warn!(
                    orphaned = outcome.orphaned_locks.len(),
                    "locked sub-questions are no longer part of the strategy; their candidates are kept"
                );
            }
            Ok(outcome)
        }
        Err(error @ Phase2Error::RegenerationNeedsConfirmation { .. }) => {
            progress.finish_clear();
            Err(anyhow::Error::new(error)
                .context("re-run with --confirm to regenerate over existing work"))
        }
        Err(error) => {
            progress.finish_err("Generation failed; previous strategy kept");
            Err(error.into())
        }
    }
}
