use crate::api::AuthApi;

/// Ask the backend whether first-run setup has been completed.
///
/// Fails closed: any transport error, non-2xx status, or undecodable body is
/// reported as "not initialized", which routes to the setup flow instead of a
/// live dashboard.
pub async fn probe<A: AuthApi>(api: &A) -> bool {
    match api.check_system_status().await {
        Ok(status) => {
            tracing::debug!(initialized = status.initialized, "system status probed");
            status.initialized
        }
        Err(error) => {
            tracing::warn!(%error, "system status probe failed; treating system as not initialized");
            false
        }
    }
}
