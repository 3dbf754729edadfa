use serde::Serialize;

use stay_auth::RememberedLogin;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::AuthLoginArgs;
use crate::commands::shared::{SessionSummary, settle};
use crate::context::AppContext;
use crate::output::output;

#[derive(Serialize)]
struct AuthLoginResponse {
    success: bool,
    #[serde(flatten)]
    session: SessionSummary,
}

pub async fn handle(
    args: &AuthLoginArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let remembered = ctx.controller.remembered_login();
    let (email, organization) = resolve_target(args, remembered.as_ref())?;

    let result = ctx
        .controller
        .login(&email, &args.password, organization.as_deref())
        .await;
    settle(result, flags)?;

    output(
        &AuthLoginResponse {
            success: true,
            session: SessionSummary::from(&ctx.controller.snapshot()),
        },
        flags.format,
    )
}

/// Email and organization for the login, filling gaps from the last login.
fn resolve_target(
    args: &AuthLoginArgs,
    remembered: Option<&RememberedLogin>,
) -> anyhow::Result<(String, Option<String>)> {
    let email = match (&args.email, remembered) {
        (Some(email), _) => email.clone(),
        (None, Some(last)) => last.email.clone(),
        (None, None) => anyhow::bail!("auth login: --email is required"),
    };

    let organization = if args.system_owner {
        None
    } else {
        match (&args.org, remembered) {
            (Some(org), _) => Some(org.clone()),
            (None, Some(last)) => last.organization_slug.clone(),
            (None, None) => {
                anyhow::bail!("auth login: --org is required (or pass --system-owner)")
            }
        }
    };

    Ok((email, organization))
}
