use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to its handler module.
pub async fn dispatch(
    command: &Commands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match command {
        Commands::System { action } => commands::system::handle(action, ctx, flags).await,
        Commands::Auth { action } => commands::auth::handle(action, ctx, flags).await,
        Commands::Dashboard => commands::dashboard::handle(ctx, flags),
    }
}
