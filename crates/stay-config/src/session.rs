//! Session controller and credential storage configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::error::ConfigError;

/// Longest accepted session-age tick: one day.
pub const MAX_TICK_INTERVAL_SECS: u64 = 86_400;

const fn default_tick_interval_secs() -> u64 {
    60
}

fn default_keyring_service() -> String {
    "staybook".to_string()
}

/// Where the credential store keeps the persisted session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialBackend {
    /// OS keychain, falling back to the credentials file.
    #[default]
    Keyring,
    /// Credentials file only.
    File,
    /// In-process only; nothing survives a restart.
    Memory,
}

impl CredentialBackend {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Keyring => "keyring",
            Self::File => "file",
            Self::Memory => "memory",
        }
    }
}

impl fmt::Display for CredentialBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    /// How often the session-age counter advances, in seconds.
    #[serde(default = "default_tick_interval_secs")]
    pub tick_interval_secs: u64,

    #[serde(default)]
    pub credential_backend: CredentialBackend,

    /// Directory for the credentials file. Empty means `~/.staybook`.
    #[serde(default)]
    pub credentials_dir: String,

    /// Keychain service name used by the keyring backend.
    #[serde(default = "default_keyring_service")]
    pub keyring_service: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: default_tick_interval_secs(),
            credential_backend: CredentialBackend::default(),
            credentials_dir: String::new(),
            keyring_service: default_keyring_service(),
        }
    }
}

impl SessionConfig {
    /// Resolved credentials directory, or `None` if no home directory exists.
    #[must_use]
    pub fn credentials_dir(&self) -> Option<PathBuf> {
        if !self.credentials_dir.trim().is_empty() {
            return Some(PathBuf::from(self.credentials_dir.trim()));
        }
        dirs::home_dir().map(|home| home.join(".staybook"))
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "session.tick_interval_secs".into(),
                reason: "must be greater than zero".into(),
            });
        }
        if self.tick_interval_secs > MAX_TICK_INTERVAL_SECS {
            return Err(ConfigError::InvalidValue {
                field: "session.tick_interval_secs".into(),
                reason: format!("must be at most {MAX_TICK_INTERVAL_SECS}"),
            });
        }
        if self.credential_backend == CredentialBackend::Keyring
            && self.keyring_service.trim().is_empty()
        {
            return Err(ConfigError::InvalidValue {
                field: "session.keyring_service".into(),
                reason: "must not be empty when credential_backend = \"keyring\"".into(),
            });
        }
        Ok(())
    }
}
