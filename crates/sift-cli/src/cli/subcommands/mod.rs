mod admin;
mod filters;
mod protocol;
mod sources;
mod strategy;

pub use admin::AdminCommands;
pub use filters::FilterCommands;
pub use protocol::ProtocolCommands;
pub use sources::SourceCommands;
pub use strategy::StrategyCommands;
