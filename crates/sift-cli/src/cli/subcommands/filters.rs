use clap::Subcommand;

/// Result filter commands.
#[derive(Clone, Debug, Subcommand)]
pub enum FilterCommands {
    /// Show the filters applied to later searches.
    Show,
    /// Change filters. Omitted options keep their current value.
    Set {
        /// First publication year to keep (inclusive)
        #[arg(long)]
        from: Option<i32>,

        /// Last publication year to keep (inclusive)
        #[arg(long)]
        to: Option<i32>,

        /// Drop records without a publication year (true/false)
        #[arg(long)]
        hide_missing_year: Option<bool>,

        /// Drop records outside the year range (true/false)
        #[arg(long)]
        enforce_year_range: Option<bool>,
    },
}
