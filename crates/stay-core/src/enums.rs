//! Lifecycle enums for the session controller.
//!
//! Both enums use `snake_case` serialization and expose
//! `allowed_next_states()` so the controller can reject transitions that the
//! lifecycle does not permit.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::CoreError;

// ---------------------------------------------------------------------------
// SessionPhase
// ---------------------------------------------------------------------------

/// Phase of the session controller.
///
/// ```text
/// booting → uninitialized → authenticated
///                         → anonymous
///         → anonymous     → authenticated → anonymous
///         → authenticated → anonymous
/// ```
///
/// `authenticated → authenticated` covers a user refresh; `anonymous →
/// anonymous` covers a logout or invalidation with nothing to clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Booting,
    Uninitialized,
    Anonymous,
    Authenticated,
}

impl SessionPhase {
    /// Valid next states from the current state.
    #[must_use]
    #[allow(clippy::match_same_arms)]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Booting => &[Self::Uninitialized, Self::Anonymous, Self::Authenticated],
            Self::Uninitialized => &[Self::Authenticated, Self::Anonymous],
            Self::Anonymous => &[Self::Authenticated, Self::Anonymous],
            Self::Authenticated => &[Self::Anonymous, Self::Authenticated],
        }
    }

    /// Check whether transitioning to `next` is allowed.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    /// Like [`can_transition_to`](Self::can_transition_to), as a `Result`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidTransition` if the lifecycle forbids `next`.
    pub fn ensure_transition(self, next: Self) -> Result<(), CoreError> {
        if self.can_transition_to(next) {
            Ok(())
        } else {
            Err(CoreError::InvalidTransition {
                machine: "session",
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Booting => "booting",
            Self::Uninitialized => "uninitialized",
            Self::Anonymous => "anonymous",
            Self::Authenticated => "authenticated",
        }
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// InitializationState
// ---------------------------------------------------------------------------

/// Whether the deployment has completed first-run setup.
///
/// ```text
/// unknown → uninitialized → initialized
///         → initialized
/// ```
///
/// Monotonic for the lifetime of a controller: once `initialized`, only a new
/// controller (and a new probe) can observe a backend-side reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitializationState {
    Unknown,
    Uninitialized,
    Initialized,
}

impl InitializationState {
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Unknown => &[Self::Uninitialized, Self::Initialized],
            Self::Uninitialized => &[Self::Initialized],
            Self::Initialized => &[],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    /// # Errors
    ///
    /// Returns `CoreError::InvalidTransition` if the lifecycle forbids `next`.
    pub fn ensure_transition(self, next: Self) -> Result<(), CoreError> {
        if self.can_transition_to(next) {
            Ok(())
        } else {
            Err(CoreError::InvalidTransition {
                machine: "initialization",
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }

    #[must_use]
    pub const fn is_initialized(self) -> bool {
        matches!(self, Self::Initialized)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Uninitialized => "uninitialized",
            Self::Initialized => "initialized",
        }
    }
}

impl fmt::Display for InitializationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booting_can_reach_every_settled_phase() {
        for next in [
            SessionPhase::Uninitialized,
            SessionPhase::Anonymous,
            SessionPhase::Authenticated,
        ] {
            assert!(SessionPhase::Booting.can_transition_to(next));
        }
    }

    #[test]
    fn nothing_returns_to_booting() {
        for from in [
            SessionPhase::Uninitialized,
            SessionPhase::Anonymous,
            SessionPhase::Authenticated,
        ] {
            assert!(!from.can_transition_to(SessionPhase::Booting));
        }
    }

    #[test]
    fn settled_phases_never_fall_back_to_uninitialized() {
        assert!(!SessionPhase::Anonymous.can_transition_to(SessionPhase::Uninitialized));
        assert!(!SessionPhase::Authenticated.can_transition_to(SessionPhase::Uninitialized));
    }

    #[test]
    fn ensure_transition_reports_both_ends() {
        let err = SessionPhase::Authenticated
            .ensure_transition(SessionPhase::Booting)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid state transition: session from authenticated to booting"
        );
    }

    #[test]
    fn initialization_is_monotonic() {
        assert!(InitializationState::Unknown.can_transition_to(InitializationState::Initialized));
        assert!(
            InitializationState::Uninitialized.can_transition_to(InitializationState::Initialized)
        );
        assert!(
            !InitializationState::Initialized.can_transition_to(InitializationState::Uninitialized)
        );
        assert!(InitializationState::Initialized.allowed_next_states().is_empty());
    }

    #[test]
    fn phases_serialize_snake_case() {
        let json = serde_json::to_string(&SessionPhase::Authenticated).unwrap();
        assert_eq!(json, "\"authenticated\"");
        let parsed: InitializationState = serde_json::from_str("\"uninitialized\"").unwrap();
        assert_eq!(parsed, InitializationState::Uninitialized);
    }
}
