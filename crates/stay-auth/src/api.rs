//! The remote authentication API as the session controller sees it.
//!
//! [`AuthApi`] is the seam between the controller and the network;
//! [`crate::http::HttpAuthApi`] is the `reqwest` implementation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;

use stay_core::{OrganizationSummary, TokenPair, User};

/// Failure of a single API call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// No response at all (offline, timeout, DNS, connection refused).
    #[error("transport error: {0}")]
    Transport(String),

    /// The backend answered with a non-2xx status.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// 2xx response whose body could not be decoded.
    #[error("malformed response: {0}")]
    Decode(String),
}

impl ApiError {
    /// The backend no longer accepts the credentials sent with the request.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status: 401 | 403, .. })
    }
}

/// `GET system status` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemStatus {
    pub initialized: bool,
}

/// Login request body. `organization_slug = None` is the system-owner login.
#[derive(Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub organization_slug: Option<String>,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("organization_slug", &self.organization_slug)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub tokens: TokenPair,
    pub user: User,
}

/// Organization half of the first-run setup form.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OrganizationPayload {
    pub name: String,
    pub slug: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub email: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub phone: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub address: String,
}

/// Administrator half of the first-run setup form.
#[derive(Clone, Default, Serialize)]
pub struct AdminPayload {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub password_confirm: String,
}

impl fmt::Debug for AdminPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminPayload")
            .field("email", &self.email)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("password", &"<redacted>")
            .field("password_confirm", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct InitializeSystemRequest<'a> {
    pub organization: &'a OrganizationPayload,
    pub admin_user: &'a AdminPayload,
}

/// What the backend reports after a successful first-run setup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InitializeSystemResponse {
    #[serde(default)]
    pub system_admin: Option<User>,
    #[serde(default)]
    pub org_admin: Option<User>,
    #[serde(default)]
    pub organization: Option<OrganizationSummary>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Remote authentication API required by the session controller.
pub trait AuthApi: Send + Sync {
    fn check_system_status(&self) -> impl Future<Output = Result<SystemStatus, ApiError>> + Send;

    fn login(
        &self,
        request: &LoginRequest,
    ) -> impl Future<Output = Result<LoginResponse, ApiError>> + Send;

    /// Revoke the refresh token. Callers ignore failures.
    fn logout(&self, tokens: &TokenPair) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Fetch the user that owns `access_token`.
    fn current_user(&self, access_token: &str)
    -> impl Future<Output = Result<User, ApiError>> + Send;

    fn initialize_system(
        &self,
        organization: &OrganizationPayload,
        admin: &AdminPayload,
    ) -> impl Future<Output = Result<InitializeSystemResponse, ApiError>> + Send;
}

impl<T: AuthApi> AuthApi for Arc<T> {
    fn check_system_status(&self) -> impl Future<Output = Result<SystemStatus, ApiError>> + Send {
        (**self).check_system_status()
    }

    fn login(
        &self,
        request: &LoginRequest,
    ) -> impl Future<Output = Result<LoginResponse, ApiError>> + Send {
        (**self).login(request)
    }

    fn logout(&self, tokens: &TokenPair) -> impl Future<Output = Result<(), ApiError>> + Send {
        (**self).logout(tokens)
    }

    fn current_user(
        &self,
        access_token: &str,
    ) -> impl Future<Output = Result<User, ApiError>> + Send {
        (**self).current_user(access_token)
    }

    fn initialize_system(
        &self,
        organization: &OrganizationPayload,
        admin: &AdminPayload,
    ) -> impl Future<Output = Result<InitializeSystemResponse, ApiError>> + Send {
        (**self).initialize_system(organization, admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_owner_login_sends_null_slug() {
        let request = LoginRequest {
            email: "root@x.com".into(),
            password: "secret123".into(),
            organization_slug: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert!(value["organization_slug"].is_null());
        assert!(value.as_object().unwrap().contains_key("organization_slug"));
    }

    #[test]
    fn login_request_debug_hides_password() {
        let request = LoginRequest {
            email: "a@x.com".into(),
            password: "secret123".into(),
            organization_slug: Some("hotel-paradise".into()),
        };
        assert!(!format!("{request:?}").contains("secret123"));
    }

    #[test]
    fn login_response_decodes_flat_tokens() {
        let response: LoginResponse = serde_json::from_str(
            r#"{"access_token":"t1","refresh_token":"r1","user":{"id":1,"role":"manager","first_name":"Anna"}}"#,
        )
        .unwrap();
        assert_eq!(response.tokens, TokenPair::new("t1", "r1"));
        assert_eq!(response.user.first_name, "Anna");
    }

    #[test]
    fn initialize_request_nests_both_payloads() {
        let organization = OrganizationPayload {
            name: "Hotel Paradise".into(),
            slug: "hotel-paradise".into(),
            ..Default::default()
        };
        let admin = AdminPayload {
            email: "admin@paradise.example".into(),
            first_name: "Ada".into(),
            last_name: "Lind".into(),
            password: "longenough".into(),
            password_confirm: "longenough".into(),
        };
        let value = serde_json::to_value(InitializeSystemRequest {
            organization: &organization,
            admin_user: &admin,
        })
        .unwrap();
        assert_eq!(value["organization"]["slug"], "hotel-paradise");
        assert!(value["organization"].get("phone").is_none());
        assert_eq!(value["admin_user"]["email"], "admin@paradise.example");
    }

    #[test]
    fn unauthorized_covers_401_and_403() {
        for status in [401, 403] {
            let err = ApiError::Status {
                status,
                message: String::new(),
            };
            assert!(err.is_unauthorized());
        }
        let unavailable = ApiError::Status {
            status: 503,
            message: "Service Unavailable".into(),
        };
        assert!(!unavailable.is_unauthorized());
        assert!(!ApiError::Transport("timeout".into()).is_unauthorized());
    }
}
