use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::enums::{InitializationState, SessionPhase};
use crate::user::User;
use crate::view::ViewId;

/// Access/refresh token pair issued at login.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl TokenPair {
    #[must_use]
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }

    /// Both tokens carry a value.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.access_token.trim().is_empty() && !self.refresh_token.trim().is_empty()
    }
}

// Tokens never show up in logs.
impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// A live session: tokens, the user they belong to, and when login happened.
///
/// The three parts only exist together, so a user without tokens (or tokens
/// without a user) cannot be represented. This is also the record persisted by
/// the credential store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveSession {
    #[serde(flatten)]
    pub tokens: TokenPair,
    pub user: User,
    pub logged_in_at: DateTime<Utc>,
}

impl ActiveSession {
    #[must_use]
    pub const fn new(tokens: TokenPair, user: User, logged_in_at: DateTime<Utc>) -> Self {
        Self {
            tokens,
            user,
            logged_in_at,
        }
    }

    /// Same tokens and login time, freshly fetched user.
    #[must_use]
    pub fn with_user(self, user: User) -> Self {
        Self { user, ..self }
    }

    /// Whole minutes since login, clamped at zero for clocks that moved back.
    #[must_use]
    pub fn elapsed_minutes(&self, now: DateTime<Utc>) -> u64 {
        u64::try_from((now - self.logged_in_at).num_minutes()).unwrap_or(0)
    }
}

/// Read-only view of the session controller's state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub initialization: InitializationState,
    pub session: Option<ActiveSession>,
    pub session_age_minutes: u64,
}

impl SessionSnapshot {
    /// State at process start.
    #[must_use]
    pub const fn booting() -> Self {
        Self {
            phase: SessionPhase::Booting,
            initialization: InitializationState::Unknown,
            session: None,
            session_age_minutes: 0,
        }
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self.phase, SessionPhase::Authenticated)
    }

    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.session.as_ref().map(|session| &session.user)
    }

    #[must_use]
    pub fn tokens(&self) -> Option<&TokenPair> {
        self.session.as_ref().map(|session| &session.tokens)
    }

    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.tokens().map(|tokens| tokens.access_token.as_str())
    }

    #[must_use]
    pub fn logged_in_at(&self) -> Option<DateTime<Utc>> {
        self.session.as_ref().map(|session| session.logged_in_at)
    }

    /// Dashboard for the current user; only while authenticated.
    #[must_use]
    pub fn view(&self) -> Option<ViewId> {
        if !self.is_authenticated() {
            return None;
        }
        self.user().map(User::view)
    }
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self::booting()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::role::Role;
    use crate::user::EntityId;

    fn anna() -> User {
        User {
            id: EntityId::Int(1),
            role: Role::Manager,
            first_name: "Anna".into(),
            last_name: String::new(),
            email: None,
            organization: None,
        }
    }

    #[test]
    fn token_debug_is_redacted() {
        let rendered = format!("{:?}", TokenPair::new("t1-secret", "r1-secret"));
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn incomplete_token_pair_detected() {
        assert!(TokenPair::new("t1", "r1").is_complete());
        assert!(!TokenPair::new("t1", "").is_complete());
        assert!(!TokenPair::new(" ", "r1").is_complete());
    }

    #[test]
    fn persisted_record_uses_flat_token_fields() {
        let logged_in_at = DateTime::parse_from_rfc3339("2026-01-02T03:04:05Z")
            .unwrap()
            .with_timezone(&Utc);
        let session = ActiveSession::new(TokenPair::new("t1", "r1"), anna(), logged_in_at);
        let value = serde_json::to_value(&session).unwrap();
        assert_eq!(value["access_token"], "t1");
        assert_eq!(value["refresh_token"], "r1");
        assert_eq!(value["user"]["role"], "manager");
        assert_eq!(value["logged_in_at"], "2026-01-02T03:04:05Z");
    }

    #[test]
    fn with_user_keeps_tokens_and_login_time() {
        let logged_in_at = Utc::now();
        let session = ActiveSession::new(TokenPair::new("t1", "r1"), anna(), logged_in_at);
        let mut promoted = anna();
        promoted.role = Role::Admin;

        let refreshed = session.clone().with_user(promoted.clone());
        assert_eq!(refreshed.tokens, session.tokens);
        assert_eq!(refreshed.logged_in_at, logged_in_at);
        assert_eq!(refreshed.user, promoted);
    }

    #[test]
    fn elapsed_minutes_truncates_and_clamps() {
        let now = Utc::now();
        let session = ActiveSession::new(
            TokenPair::new("t1", "r1"),
            anna(),
            now - TimeDelta::seconds(150),
        );
        assert_eq!(session.elapsed_minutes(now), 2);

        let future = ActiveSession::new(
            TokenPair::new("t1", "r1"),
            anna(),
            now + TimeDelta::minutes(5),
        );
        assert_eq!(future.elapsed_minutes(now), 0);
    }

    #[test]
    fn view_requires_authenticated_phase() {
        let session = ActiveSession::new(TokenPair::new("t1", "r1"), anna(), Utc::now());
        let mut snapshot = SessionSnapshot {
            phase: SessionPhase::Anonymous,
            initialization: InitializationState::Initialized,
            session: Some(session),
            session_age_minutes: 0,
        };
        assert_eq!(snapshot.view(), None);

        snapshot.phase = SessionPhase::Authenticated;
        assert_eq!(snapshot.view(), Some(ViewId::ManagerDashboard));
    }
}
