use serde::Serialize;

use stay_core::SessionPhase;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

#[derive(Serialize)]
struct AuthLogoutResponse {
    success: bool,
    phase: SessionPhase,
}

pub async fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    ctx.controller.logout().await;
    output(
        &AuthLogoutResponse {
            success: true,
            phase: ctx.controller.phase(),
        },
        flags.format,
    )
}
