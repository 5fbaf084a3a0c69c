use std::path::PathBuf;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::ProtocolCommands;
use crate::commands::shared::protocol_file::read_protocol;
use crate::context::AppContext;
use crate::output::output;

/// Handle `sift protocol`.
pub async fn handle(
    action: &ProtocolCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let review_id = ctx.review_id()?;
    match action {
        ProtocolCommands::Show => {
            let project = ctx.service.project(review_id).await?;
            output(&project.protocol, flags.format)
        }
        ProtocolCommands::Set { file } => {
            let protocol = read_protocol(&PathBuf::from(file))?;
            let project = ctx.service.update_protocol(review_id, &protocol).await?;
            output(&project, flags.format)
        }
    }
}
