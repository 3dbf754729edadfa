use clap::Subcommand;

use super::subcommands::{AuthCommands, SystemCommands};

#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// First-run setup and system status.
    System {
        #[command(subcommand)]
        action: SystemCommands,
    },
    /// Log in, log out and inspect the current session.
    Auth {
        #[command(subcommand)]
        action: AuthCommands,
    },
    /// Show which dashboard the current user lands on.
    Dashboard,
}
