use crate::cli::GlobalFlags;
use crate::commands::shared::SessionSummary;
use crate::context::AppContext;
use crate::output::output;

/// Print the session on every change until Ctrl-C.
pub async fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let mut changes = ctx.controller.subscribe();
    let initial = SessionSummary::from(&*changes.borrow_and_update());
    output(&initial, flags.format)?;

    loop {
        tokio::select! {
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                let summary = SessionSummary::from(&*changes.borrow_and_update());
                output(&summary, flags.format)?;
            }
            signal = tokio::signal::ctrl_c() => {
                if let Err(error) = signal {
                    tracing::warn!(%error, "failed to listen for Ctrl-C");
                }
                break;
            }
        }
    }

    tracing::debug!("watch stopped");
    Ok(())
}
