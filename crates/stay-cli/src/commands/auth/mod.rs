mod login;
mod logout;
mod refresh;
mod status;
mod watch;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::AuthCommands;
use crate::context::AppContext;

/// Handle `stay auth <subcommand>`.
pub async fn handle(
    action: &AuthCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        AuthCommands::Login(args) => login::handle(args, ctx, flags).await,
        AuthCommands::Logout => logout::handle(ctx, flags).await,
        AuthCommands::Status => status::handle(ctx, flags),
        AuthCommands::Refresh => refresh::handle(ctx, flags).await,
        AuthCommands::Watch => watch::handle(ctx, flags).await,
    }
}
