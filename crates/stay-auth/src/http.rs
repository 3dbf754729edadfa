//! `reqwest` implementation of [`AuthApi`].

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use stay_config::ApiConfig;
use stay_core::{TokenPair, User};

use crate::api::{
    AdminPayload, ApiError, AuthApi, InitializeSystemRequest, InitializeSystemResponse,
    LoginRequest, LoginResponse, OrganizationPayload, SystemStatus,
};

const SYSTEM_STATUS_PATH: &str = "auth/system-status/";
const LOGIN_PATH: &str = "auth/login/";
const LOGOUT_PATH: &str = "auth/logout/";
const CURRENT_USER_PATH: &str = "auth/me/";
const INITIALIZE_SYSTEM_PATH: &str = "auth/initialize-system/";

/// Fields checked, in order, for a human-readable message in an error body.
const MESSAGE_FIELDS: [&str; 3] = ["detail", "message", "error"];

#[derive(Debug, Clone)]
pub struct HttpAuthApi {
    client: Client,
    base_url: String,
}

impl HttpAuthApi {
    /// Build a client rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Transport` if the HTTP client cannot be constructed.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Transport(format!("build http client: {e}")))?;
        Ok(Self {
            client,
            base_url: format!("{}/", base_url.trim().trim_end_matches('/')),
        })
    }

    /// # Errors
    ///
    /// Returns `ApiError::Transport` if the HTTP client cannot be constructed.
    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        Self::new(
            &config.normalized_base_url(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send(&self, request: RequestBuilder, what: &str) -> Result<Response, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(format!("{what}: {e}")))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::debug!(%status, what, "backend rejected request");
        Err(ApiError::Status {
            status: status.as_u16(),
            message: extract_error_message(&body).unwrap_or_default(),
        })
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        what: &str,
    ) -> Result<T, ApiError> {
        let response = self.send(request, what).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::Transport(format!("{what}: read body: {e}")))?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(format!("{what}: {e}")))
    }
}

impl AuthApi for HttpAuthApi {
    async fn check_system_status(&self) -> Result<SystemStatus, ApiError> {
        self.send_json(self.client.get(self.url(SYSTEM_STATUS_PATH)), "system status")
            .await
    }

    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        self.send_json(self.client.post(self.url(LOGIN_PATH)).json(request), "login")
            .await
    }

    async fn logout(&self, tokens: &TokenPair) -> Result<(), ApiError> {
        let request = self
            .client
            .post(self.url(LOGOUT_PATH))
            .bearer_auth(&tokens.access_token)
            .json(&serde_json::json!({ "refresh_token": tokens.refresh_token }));
        self.send(request, "logout").await.map(|_| ())
    }

    async fn current_user(&self, access_token: &str) -> Result<User, ApiError> {
        let request = self
            .client
            .get(self.url(CURRENT_USER_PATH))
            .bearer_auth(access_token);
        self.send_json(request, "current user").await
    }

    async fn initialize_system(
        &self,
        organization: &OrganizationPayload,
        admin: &AdminPayload,
    ) -> Result<InitializeSystemResponse, ApiError> {
        let body = InitializeSystemRequest {
            organization,
            admin_user: admin,
        };
        self.send_json(
            self.client.post(self.url(INITIALIZE_SYSTEM_PATH)).json(&body),
            "initialize system",
        )
        .await
    }
}

/// Pull a user-facing message out of an error response body.
///
/// Understands `{"detail": ..}`, `{"message": ..}`, `{"error": ..}`,
/// `{"non_field_errors": [..]}` and per-field `{"slug": ["..."]}` shapes, and
/// short plain-text bodies.
#[must_use]
pub fn extract_error_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        let looks_like_markup = body.starts_with('<');
        return (!looks_like_markup && body.len() <= 200).then(|| body.to_string());
    };

    let object = value.as_object()?;
    for field in MESSAGE_FIELDS {
        if let Some(message) = object.get(field).and_then(first_text) {
            return Some(message);
        }
    }
    if let Some(message) = object.get("non_field_errors").and_then(first_text) {
        return Some(message);
    }
    object
        .iter()
        .find_map(|(field, value)| first_text(value).map(|message| format!("{field}: {message}")))
}

fn first_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
        serde_json::Value::Array(items) => items.iter().find_map(first_text),
        _ => None,
    }
}
