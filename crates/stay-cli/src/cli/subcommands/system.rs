use clap::{Args, Subcommand};

#[derive(Clone, Debug, Subcommand)]
pub enum SystemCommands {
    /// Report whether first-run setup has been completed.
    Status,
    /// Create the first organization and its administrator.
    Init(SystemInitArgs),
}

#[derive(Clone, Debug, Args)]
pub struct SystemInitArgs {
    #[arg(long)]
    pub org_name: String,

    #[arg(long)]
    pub org_slug: String,

    #[arg(long, default_value = "")]
    pub org_email: String,

    #[arg(long, default_value = "")]
    pub org_phone: String,

    #[arg(long, default_value = "")]
    pub org_address: String,

    #[arg(long)]
    pub admin_email: String,

    #[arg(long)]
    pub admin_first_name: String,

    #[arg(long)]
    pub admin_last_name: String,

    #[arg(long)]
    pub admin_password: String,

    /// Must match --admin-password exactly.
    #[arg(long)]
    pub admin_password_confirm: String,
}
