use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::commands::shared::{SessionSummary, settle};
use crate::context::AppContext;
use crate::output::output;

#[derive(Serialize)]
struct AuthRefreshResponse {
    success: bool,
    #[serde(flatten)]
    session: SessionSummary,
}

pub async fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let result = ctx.controller.refresh_user_data().await;
    settle(result, flags)?;

    output(
        &AuthRefreshResponse {
            success: true,
            session: SessionSummary::from(&ctx.controller.snapshot()),
        },
        flags.format,
    )
}
