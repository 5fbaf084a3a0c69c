use clap::Subcommand;

/// Source selection commands.
#[derive(Clone, Debug, Subcommand)]
pub enum SourceCommands {
    /// List supported sources and whether each is selected.
    List,
    /// Replace the selection (e.g. `pubmed crossref`). No arguments clears it.
    Set {
        /// Source names: semantic_scholar, pubmed, crossref, europe_pmc
        sources: Vec<String>,
    },
}
