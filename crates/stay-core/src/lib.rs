//! # stay-core
//!
//! Core types shared across the Staybook crates:
//! - The authenticated principal (`User`, `Role`, `OrganizationRef`)
//! - Session state held by the session controller (`ActiveSession`, `SessionSnapshot`)
//! - Lifecycle enums with transition tables (`SessionPhase`, `InitializationState`)
//! - The role dispatcher mapping roles to dashboard view identifiers
//! - Cross-cutting error types

pub mod enums;
pub mod errors;
pub mod role;
pub mod session;
pub mod user;
pub mod view;

pub use enums::{InitializationState, SessionPhase};
pub use errors::CoreError;
pub use role::Role;
pub use session::{ActiveSession, SessionSnapshot, TokenPair};
pub use user::{EntityId, OrganizationRef, OrganizationSummary, User};
pub use view::{ViewId, dispatch, dispatch_str};
