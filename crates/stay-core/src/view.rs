//! Role dispatcher.
//!
//! Maps a user's role to the dashboard view it should receive. The mapping is
//! total: a role the client does not recognize gets the manager dashboard, so
//! an operator with a newer role still lands on a working screen.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::role::Role;

/// Opaque identifier of a role-specific dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewId {
    OwnerDashboard,
    AdminDashboard,
    ManagerDashboard,
    CleanerDashboard,
    TechnicalDashboard,
    AccountantDashboard,
    StorekeeperDashboard,
}

impl ViewId {
    /// View for roles the client does not recognize.
    pub const FALLBACK: Self = Self::ManagerDashboard;

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OwnerDashboard => "owner_dashboard",
            Self::AdminDashboard => "admin_dashboard",
            Self::ManagerDashboard => "manager_dashboard",
            Self::CleanerDashboard => "cleaner_dashboard",
            Self::TechnicalDashboard => "technical_dashboard",
            Self::AccountantDashboard => "accountant_dashboard",
            Self::StorekeeperDashboard => "storekeeper_dashboard",
        }
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dashboard view for `role`.
#[must_use]
pub const fn dispatch(role: &Role) -> ViewId {
    match role {
        Role::SystemOwner => ViewId::OwnerDashboard,
        Role::Admin => ViewId::AdminDashboard,
        Role::Manager => ViewId::ManagerDashboard,
        Role::Cleaner => ViewId::CleanerDashboard,
        Role::TechnicalStaff => ViewId::TechnicalDashboard,
        Role::Accountant => ViewId::AccountantDashboard,
        Role::Storekeeper => ViewId::StorekeeperDashboard,
        Role::Unrecognized(_) => ViewId::FALLBACK,
    }
}

/// Dashboard view for a raw wire role value.
#[must_use]
pub fn dispatch_str(role: &str) -> ViewId {
    dispatch(&Role::from(role))
}
