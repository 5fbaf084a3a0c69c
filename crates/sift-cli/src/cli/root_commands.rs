use clap::{Args, Subcommand};

use crate::cli::subcommands::{
    AdminCommands, FilterCommands, ProtocolCommands, SourceCommands, StrategyCommands,
};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Initialize sift and create a review from a protocol file.
    Init(InitArgs),
    /// List reviews in this project.
    Reviews,
    /// Review protocol (main question, sub-questions, PICO).
    Protocol {
        #[command(subcommand)]
        action: ProtocolCommands,
    },
    /// Concept matrix and per-sub-question search strategy.
    Strategy {
        #[command(subcommand)]
        action: StrategyCommands,
    },
    /// Bibliographic sources queried by searches.
    Sources {
        #[command(subcommand)]
        action: SourceCommands,
    },
    /// Year range and missing-year filters.
    Filters {
        #[command(subcommand)]
        action: FilterCommands,
    },
    /// Search one sub-question across the selected sources.
    Search(SearchArgs),
    /// Hide a sub-question from the working set.
    Hide(HideArgs),
    /// Save records from the current results and lock their sub-question.
    Save(SaveArgs),
    /// Generate the search documentation once every sub-question is done.
    Docs,
    /// Phase progress: sub-questions, checklist, orphaned locks.
    State,
    /// Records from the most recent search.
    Results,
    /// Saved candidates.
    Candidates(CandidatesArgs),
    /// Record a screening decision for a candidate.
    Screen(ScreenArgs),
    /// PRISMA identification counters.
    Prisma,
    /// Administrative operations outside the normal flow.
    Admin {
        #[command(subcommand)]
        action: AdminCommands,
    },
}

#[derive(Clone, Debug, Args)]
pub struct InitArgs {
    /// Review name
    #[arg(long)]
    pub name: String,

    /// Protocol file (JSON or TOML)
    #[arg(long)]
    pub protocol: String,

    /// Sources to select initially (defaults to `search.default_sources`)
    #[arg(long, value_delimiter = ',')]
    pub sources: Vec<String>,
}

#[derive(Clone, Debug, Args)]
pub struct SearchArgs {
    /// Sub-question text or 1-based position
    pub subquestion: String,
}

#[derive(Clone, Debug, Args)]
pub struct HideArgs {
    /// Sub-question text or 1-based position
    pub subquestion: String,
}

#[derive(Clone, Debug, Args)]
pub struct SaveArgs {
    /// External ids of the records to save (comma-separated or repeated)
    #[arg(long, value_delimiter = ',', conflicts_with = "all")]
    pub ids: Vec<String>,

    /// Save every record of the current results
    #[arg(long)]
    pub all: bool,
}

#[derive(Clone, Debug, Args)]
pub struct CandidatesArgs {
    /// Filter by screening status: pending, included, excluded
    #[arg(long)]
    pub status: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct ScreenArgs {
    /// Candidate dedup key (e.g. `doi:10.1000/abc`)
    pub dedup_key: String,

    /// New status: included or excluded
    pub status: String,
}
