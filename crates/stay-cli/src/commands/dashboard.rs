use serde::Serialize;

use stay_core::ViewId;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

#[derive(Serialize)]
struct DashboardResponse {
    view: ViewId,
    role: String,
    user: String,
}

pub fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let snapshot = ctx.controller.snapshot();
    let (Some(view), Some(user)) = (snapshot.view(), snapshot.user()) else {
        anyhow::bail!("dashboard: not logged in. Run `stay auth login` first");
    };

    output(
        &DashboardResponse {
            view,
            role: user.role.to_string(),
            user: user.display_name(),
        },
        flags.format,
    )
}
