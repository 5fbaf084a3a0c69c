use clap::Subcommand;

/// Protocol commands.
#[derive(Clone, Debug, Subcommand)]
pub enum ProtocolCommands {
    /// Show the review protocol.
    Show,
    /// Replace the protocol from a JSON or TOML file.
    Set {
        /// Protocol file
        file: String,
    },
}
