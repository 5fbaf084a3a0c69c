use clap::Subcommand;

/// Strategy commands.
#[derive(Clone, Debug, Subcommand)]
pub enum StrategyCommands {
    /// Show the current strategy.
    Show,
    /// Step one: derive the concept matrix from the protocol.
    Derive {
        /// Regenerate even though sub-questions were already searched or saved
        #[arg(long)]
        confirm: bool,
    },
    /// Step two: derive keywords and per-source queries for each sub-question.
    Subquestions {
        /// Regenerate even though sub-questions were already searched or saved
        #[arg(long)]
        confirm: bool,
    },
}
