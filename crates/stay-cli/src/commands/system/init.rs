use serde::Serialize;

use stay_auth::{AdminPayload, OrganizationPayload};
use stay_core::SessionPhase;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::SystemInitArgs;
use crate::commands::shared::settle;
use crate::context::AppContext;
use crate::output::output;

#[derive(Serialize)]
struct SystemInitResponse {
    success: bool,
    organization: String,
    admin_email: String,
    phase: SessionPhase,
    message: Option<String>,
}

pub async fn handle(
    args: &SystemInitArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let (organization, admin) = payloads(args);
    let result = ctx.controller.initialize_system(&organization, &admin).await;
    let response = settle(result, flags)?;

    output(
        &SystemInitResponse {
            success: true,
            organization: response
                .organization
                .and_then(|org| org.slug)
                .unwrap_or(organization.slug),
            admin_email: admin.email,
            phase: ctx.controller.phase(),
            message: response.message,
        },
        flags.format,
    )
}

fn payloads(args: &SystemInitArgs) -> (OrganizationPayload, AdminPayload) {
    (
        OrganizationPayload {
            name: args.org_name.trim().to_string(),
            slug: args.org_slug.trim().to_string(),
            email: args.org_email.trim().to_string(),
            phone: args.org_phone.trim().to_string(),
            address: args.org_address.trim().to_string(),
        },
        AdminPayload {
            email: args.admin_email.trim().to_string(),
            first_name: args.admin_first_name.trim().to_string(),
            last_name: args.admin_last_name.trim().to_string(),
            password: args.admin_password.clone(),
            password_confirm: args.admin_password_confirm.clone(),
        },
    )
}
