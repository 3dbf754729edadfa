use std::time::Duration;

use anyhow::Context;
use stay_auth::{HttpAuthApi, SessionController, credential_store};
use stay_config::StayConfig;

/// Resources shared by every command, built once per process.
pub struct AppContext {
    pub config: StayConfig,
    pub controller: SessionController<HttpAuthApi>,
}

impl AppContext {
    /// Build the API client and credential store, then boot the session.
    pub async fn init(config: StayConfig) -> anyhow::Result<Self> {
        let api = HttpAuthApi::from_config(&config.api).context("failed to build API client")?;
        let store = credential_store::open(&config.session);
        let controller = SessionController::new(
            api,
            store,
            Duration::from_secs(config.session.tick_interval_secs),
        );

        let phase = controller.boot().await;
        tracing::debug!(
            %phase,
            base_url = controller.api().base_url(),
            backend = %config.session.credential_backend,
            "session controller booted"
        );

        Ok(Self { config, controller })
    }

    pub fn shutdown(&self) {
        self.controller.shutdown();
    }
}
