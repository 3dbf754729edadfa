use serde::Serialize;
use thiserror::Error;

use crate::api::ApiError;

/// Errors surfaced by the session controller.
///
/// `Display` is the user-facing message; `Transport` keeps the technical
/// detail out of it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// Rejected locally, before any network call.
    #[error("{0}")]
    Validation(String),

    /// Login refused by the backend (bad credentials, unknown organization,
    /// inactive account).
    #[error("{0}")]
    Authentication(String),

    /// The access token is no longer accepted. The session has been ended.
    #[error("{0}")]
    Authorization(String),

    /// No usable response from the backend. State is unchanged.
    #[error("Couldn't reach the server. Check your connection and try again.")]
    Transport { detail: String },

    /// System initialization rejected by the backend.
    #[error("{0}")]
    Bootstrap(String),

    #[error("not logged in")]
    NotAuthenticated,

    /// A newer user action took over the session while this call was in flight.
    #[error("superseded by a newer session action")]
    Superseded,
}

impl AuthError {
    pub(crate) fn transport(detail: impl Into<String>) -> Self {
        Self::Transport {
            detail: detail.into(),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Authentication(_) => "authentication",
            Self::Authorization(_) => "authorization",
            Self::Transport { .. } => "transport",
            Self::Bootstrap(_) => "bootstrap",
            Self::NotAuthenticated => "not_authenticated",
            Self::Superseded => "superseded",
        }
    }

    /// Map a failed login call.
    pub(crate) fn from_login_failure(error: ApiError) -> Self {
        match error {
            ApiError::Status { status, message } => Self::Authentication(non_empty_or(
                message,
                if status >= 500 {
                    "The server could not complete the login. Try again later."
                } else {
                    "Invalid email, password or organization."
                },
            )),
            other => Self::from_transport(other),
        }
    }

    /// Map a failed call made with the current access token.
    ///
    /// Only 401/403 mean the token is no longer valid. Any other status is a
    /// backend outage and leaves the session alone.
    pub(crate) fn from_session_failure(error: ApiError) -> Self {
        match error {
            ApiError::Status {
                status: 401 | 403,
                message,
            } => Self::Authorization(non_empty_or(
                message,
                "Your session has expired. Please log in again.",
            )),
            other => Self::from_transport(other),
        }
    }

    /// Map a failed system initialization call.
    pub(crate) fn from_bootstrap_failure(error: ApiError) -> Self {
        match error {
            ApiError::Status { message, .. } => {
                Self::Bootstrap(non_empty_or(message, "System initialization was rejected."))
            }
            other => Self::from_transport(other),
        }
    }

    fn from_transport(error: ApiError) -> Self {
        if matches!(error, ApiError::Decode(_)) {
            tracing::error!(%error, "malformed response from backend");
        }
        Self::transport(error.to_string())
    }
}

fn non_empty_or(message: String, fallback: &str) -> String {
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}

/// Serializable `{ success, error? }` form of a controller result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
}

impl OperationResult {
    #[must_use]
    pub const fn ok() -> Self {
        Self {
            success: true,
            error: None,
            kind: None,
        }
    }

    #[must_use]
    pub fn failure(error: &AuthError) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
            kind: Some(error.kind()),
        }
    }
}

impl<T> From<&Result<T, AuthError>> for OperationResult {
    fn from(result: &Result<T, AuthError>) -> Self {
        match result {
            Ok(_) => Self::ok(),
            Err(error) => Self::failure(error),
        }
    }
}
