use chrono::{DateTime, Utc};
use serde::Serialize;

use stay_core::{InitializationState, SessionPhase, SessionSnapshot, ViewId};

/// What every session-reporting command prints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub phase: SessionPhase,
    pub initialization: InitializationState,
    pub user: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub organization: Option<String>,
    pub view: Option<ViewId>,
    pub logged_in_at: Option<DateTime<Utc>>,
    pub session_age_minutes: u64,
}

impl From<&SessionSnapshot> for SessionSummary {
    fn from(snapshot: &SessionSnapshot) -> Self {
        let user = snapshot.user();
        Self {
            phase: snapshot.phase,
            initialization: snapshot.initialization,
            user: user.map(stay_core::User::display_name),
            email: user.and_then(|user| user.email.clone()),
            role: user.map(|user| user.role.to_string()),
            organization: user
                .and_then(|user| user.organization_slug())
                .map(String::from),
            view: snapshot.view(),
            logged_in_at: snapshot.logged_in_at(),
            session_age_minutes: snapshot.session_age_minutes,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use stay_core::{
        ActiveSession, EntityId, OrganizationRef, OrganizationSummary, Role, TokenPair, User,
    };

    use super::*;

    #[test]
    fn anonymous_snapshot_has_no_user_fields() {
        let snapshot = SessionSnapshot {
            phase: SessionPhase::Anonymous,
            initialization: InitializationState::Initialized,
            session: None,
            session_age_minutes: 0,
        };
        let summary = SessionSummary::from(&snapshot);
        assert_eq!(summary.user, None);
        assert_eq!(summary.view, None);

        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["phase"], "anonymous");
        assert_eq!(value["initialization"], "initialized");
    }

    #[test]
    fn authenticated_snapshot_reports_user_and_view() {
        let user = User {
            id: EntityId::Int(3),
            role: Role::Cleaner,
            first_name: "Cleo".into(),
            last_name: "Ek".into(),
            email: Some("cleo@paradise.example".into()),
            organization: Some(OrganizationRef::Summary(OrganizationSummary {
                id: EntityId::Int(1),
                name: Some("Hotel Paradise".into()),
                slug: Some("hotel-paradise".into()),
            })),
        };
        let snapshot = SessionSnapshot {
            phase: SessionPhase::Authenticated,
            initialization: InitializationState::Initialized,
            session: Some(ActiveSession::new(TokenPair::new("t1", "r1"), user, Utc::now())),
            session_age_minutes: 4,
        };

        let summary = SessionSummary::from(&snapshot);
        assert_eq!(summary.user.as_deref(), Some("Cleo Ek"));
        assert_eq!(summary.role.as_deref(), Some("cleaner"));
        assert_eq!(summary.organization.as_deref(), Some("hotel-paradise"));
        assert_eq!(summary.view, Some(ViewId::CleanerDashboard));
        assert_eq!(summary.session_age_minutes, 4);
    }
}
