use clap::{Args, Subcommand};

/// Session commands.
#[derive(Clone, Debug, Subcommand)]
pub enum AuthCommands {
    /// Log in with email and password.
    Login(AuthLoginArgs),
    /// Revoke the session and clear stored credentials.
    Logout,
    /// Show the current session.
    Status,
    /// Re-fetch the current user from the server.
    Refresh,
    /// Print the session whenever it changes, until Ctrl-C.
    Watch,
}

#[derive(Clone, Debug, Args)]
pub struct AuthLoginArgs {
    /// Account email. Defaults to the last email used.
    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub password: String,

    /// Organization slug. Defaults to the last organization used.
    #[arg(long, conflicts_with = "system_owner")]
    pub org: Option<String>,

    /// Log in as the system owner, without an organization.
    #[arg(long)]
    pub system_owner: bool,
}
