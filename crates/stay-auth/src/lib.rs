//! # stay-auth
//!
//! Session and first-run setup lifecycle for the Staybook admin console.
//!
//! [`SessionController`] owns the session state machine and drives the
//! backend through the [`AuthApi`] trait ([`HttpAuthApi`] over `reqwest`).
//! Session artifacts persist through a [`CredentialStore`] (OS keychain with a
//! file fallback, file only, or memory). The system status prober fails
//! closed, and the session-age counter runs only while authenticated.

pub mod api;
pub mod controller;
pub mod credential_store;
pub mod error;
pub mod http;
pub mod prober;
pub mod ticker;
pub mod token;
pub mod validation;

pub use api::{
    AdminPayload, ApiError, AuthApi, InitializeSystemResponse, LoginRequest, LoginResponse,
    OrganizationPayload, SystemStatus,
};
pub use controller::SessionController;
pub use credential_store::{CredentialStore, MemoryCredentialStore, RememberedLogin};
pub use error::{AuthError, OperationResult};
pub use http::HttpAuthApi;
