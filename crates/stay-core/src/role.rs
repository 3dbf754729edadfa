use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of an authenticated user.
///
/// The wire format is a plain `snake_case` string. Values this client does not
/// know deserialize into [`Role::Unrecognized`] rather than failing, so a user
/// record with a newer role still loads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    SystemOwner,
    Admin,
    Manager,
    Cleaner,
    TechnicalStaff,
    Accountant,
    Storekeeper,
    Unrecognized(String),
}

impl Role {
    /// All roles the client knows, in display order.
    pub const KNOWN: [Self; 7] = [
        Self::SystemOwner,
        Self::Admin,
        Self::Manager,
        Self::Cleaner,
        Self::TechnicalStaff,
        Self::Accountant,
        Self::Storekeeper,
    ];

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::SystemOwner => "system_owner",
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Cleaner => "cleaner",
            Self::TechnicalStaff => "technical_staff",
            Self::Accountant => "accountant",
            Self::Storekeeper => "storekeeper",
            Self::Unrecognized(raw) => raw,
        }
    }

    #[must_use]
    pub const fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        match value.trim() {
            "system_owner" => Self::SystemOwner,
            "admin" => Self::Admin,
            "manager" => Self::Manager,
            "cleaner" => Self::Cleaner,
            "technical_staff" => Self::TechnicalStaff,
            "accountant" => Self::Accountant,
            "storekeeper" => Self::Storekeeper,
            other => Self::Unrecognized(other.to_string()),
        }
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Unrecognized(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
