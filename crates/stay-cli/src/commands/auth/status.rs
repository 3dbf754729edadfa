use chrono::{DateTime, Utc};
use serde::Serialize;

use stay_auth::token;

use crate::cli::GlobalFlags;
use crate::commands::shared::SessionSummary;
use crate::context::AppContext;
use crate::output::output;

#[derive(Serialize)]
struct AuthStatusResponse {
    #[serde(flatten)]
    session: SessionSummary,
    access_token_expires_at: Option<DateTime<Utc>>,
    access_token_expired: Option<bool>,
    credential_source: Option<&'static str>,
    api_base_url: String,
}

pub fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let snapshot = ctx.controller.snapshot();
    let now = Utc::now();
    let expires_at = snapshot.access_token().and_then(token::access_token_expiry);

    output(
        &AuthStatusResponse {
            session: SessionSummary::from(&snapshot),
            access_token_expires_at: expires_at,
            access_token_expired: expires_at.map(|expiry| expiry <= now),
            credential_source: ctx.controller.credential_source(),
            api_base_url: ctx.controller.api().base_url().to_string(),
        },
        flags.format,
    )
}
