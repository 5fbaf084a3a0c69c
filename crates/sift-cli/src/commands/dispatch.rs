use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(
    command: Commands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match command {
        Commands::Reviews => commands::reviews::handle(ctx, flags).await,
        Commands::Protocol { action } => commands::protocol::handle(&action, ctx, flags).await,
        Commands::Strategy { action } => commands::strategy::handle(&action, ctx, flags).await,
        Commands::Sources { action } => commands::sources::handle(&action, ctx, flags).await,
        Commands::Filters { action } => commands::filters::handle(&action, ctx, flags).await,
        Commands::Search(args) => commands::search::handle(&args, ctx, flags).await,
        Commands::Hide(args) => commands::hide::handle(&args, ctx, flags).await,
        Commands::Save(args) => commands::save::handle(&args, ctx, flags).await,
        Commands::Docs => commands::docs::handle(ctx, flags).await,
        Commands::State => commands::state::handle(ctx, flags).await,
        Commands::Results => commands::results::handle(ctx, flags).await,
        Commands::Candidates(args) => commands::candidates::handle(&args, ctx, flags).await,
        Commands::Screen(args) => commands::screen::handle(&args, ctx, flags).await,
        Commands::Prisma => commands::prisma::handle(ctx, flags).await,
        Commands::Admin { action } => commands::admin::handle(&action, ctx, flags).await,
        Commands::Init(_) => {
            anyhow::bail!("init is handled before the application context is created")
        }
    }
}
