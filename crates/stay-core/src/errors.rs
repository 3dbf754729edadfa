//! Cross-cutting error types for Staybook.
//!
//! Transport and authentication errors live in `stay-auth`; configuration
//! errors live in `stay-config`. This module only carries errors that the core
//! types themselves can raise.

use thiserror::Error;

/// Errors raised by core types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// A state machine transition was attempted that is not allowed.
    #[error("Invalid state transition: {machine} from {from} to {to}")]
    InvalidTransition {
        machine: &'static str,
        from: String,
        to: String,
    },

    /// Data failed validation (format, constraints).
    #[error("Validation error: {0}")]
    Validation(String),
}
