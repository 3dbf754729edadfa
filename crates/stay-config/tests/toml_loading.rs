//! Integration tests for TOML configuration loading.
//!
//! Uses `figment::Jail` for sandboxed file and env var manipulation.

use figment::{
    Figment, Jail,
    providers::{Format, Serialized, Toml},
};
use pretty_assertions::assert_eq;
use stay_config::{CredentialBackend, StayConfig};

#[test]
fn loads_api_config_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[api]
base_url = "https://pms.example.com/api"
timeout_secs = 30
"#,
        )?;

        let config: StayConfig = Figment::from(Serialized::defaults(StayConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.api.base_url, "https://pms.example.com/api");
        assert_eq!(config.api.normalized_base_url(), "https://pms.example.com/api/");
        assert_eq!(config.api.timeout_secs, 30);
        Ok(())
    });
}

#[test]
fn loads_session_config_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[session]
tick_interval_secs = 5
credential_backend = "file"
credentials_dir = "/tmp/staybook-creds"
"#,
        )?;

        let config: StayConfig = Figment::from(Serialized::defaults(StayConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.session.tick_interval_secs, 5);
        assert_eq!(config.session.credential_backend, CredentialBackend::File);
        assert_eq!(config.session.credentials_dir, "/tmp/staybook-creds");
        assert_eq!(config.session.keyring_service, "staybook");
        Ok(())
    });
}

#[test]
fn project_config_is_picked_up_by_default_chain() {
    Jail::expect_with(|jail| {
        jail.create_dir(".staybook")?;
        jail.create_file(
            ".staybook/config.toml",
            r#"
[session]
credential_backend = "memory"
"#,
        )?;

        let config = StayConfig::load().expect("config loads");
        assert_eq!(config.session.credential_backend, CredentialBackend::Memory);
        Ok(())
    });
}

#[test]
fn invalid_values_are_rejected_after_extraction() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[session]
tick_interval_secs = 0
"#,
        )?;

        let figment = Figment::from(Serialized::defaults(StayConfig::default()))
            .merge(Toml::file("config.toml"));
        let err = StayConfig::from_figment(&figment).unwrap_err();
        assert!(err.to_string().contains("session.tick_interval_secs"));
        Ok(())
    });
}

#[test]
fn unknown_backend_is_a_figment_error() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[session]
credential_backend = "browser"
"#,
        )?;

        let figment = Figment::from(Serialized::defaults(StayConfig::default()))
            .merge(Toml::file("config.toml"));
        let err = StayConfig::from_figment(&figment).unwrap_err();
        assert!(err.to_string().starts_with("Configuration error"));
        Ok(())
    });
}
