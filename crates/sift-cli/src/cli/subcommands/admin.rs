use clap::Subcommand;

/// Administrative commands.
#[derive(Clone, Debug, Subcommand)]
pub enum AdminCommands {
    /// Remove the lock from a saved sub-question. Saved candidates are kept.
    Unlock {
        /// Sub-question text or 1-based position
        subquestion: String,
    },
}
