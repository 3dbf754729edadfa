use serde::Serialize;

use stay_core::{InitializationState, SessionPhase};

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

#[derive(Serialize)]
struct SystemStatusResponse {
    initialized: bool,
    initialization: InitializationState,
    phase: SessionPhase,
    api_base_url: String,
}

/// The probe already ran while the context booted; report what it found.
pub fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let snapshot = ctx.controller.snapshot();
    output(
        &SystemStatusResponse {
            initialized: snapshot.initialization.is_initialized(),
            initialization: snapshot.initialization,
            phase: snapshot.phase,
            api_base_url: ctx.config.api.normalized_base_url(),
        },
        flags.format,
    )
}
