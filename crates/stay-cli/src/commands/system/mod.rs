mod init;
mod status;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::SystemCommands;
use crate::context::AppContext;

/// Handle `stay system <subcommand>`.
pub async fn handle(
    action: &SystemCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        SystemCommands::Status => status::handle(ctx, flags),
        SystemCommands::Init(args) => init::handle(args, ctx, flags).await,
    }
}
