use serde::{Deserialize, Serialize};
use std::fmt;

use crate::role::Role;
use crate::view::{ViewId, dispatch};

/// Backend identifier. Accepts integer and string keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Int(i64),
    Str(String),
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(id) => write!(f, "{id}"),
            Self::Str(id) => f.write_str(id),
        }
    }
}

impl From<i64> for EntityId {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

/// Organization fields the backend may embed in a user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationSummary {
    pub id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

/// Reference to the organization a user belongs to.
///
/// The backend sends either a bare id or a small summary object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OrganizationRef {
    Summary(OrganizationSummary),
    Id(EntityId),
}

impl OrganizationRef {
    #[must_use]
    pub const fn id(&self) -> &EntityId {
        match self {
            Self::Summary(summary) => &summary.id,
            Self::Id(id) => id,
        }
    }

    #[must_use]
    pub fn slug(&self) -> Option<&str> {
        match self {
            Self::Summary(summary) => summary.slug.as_deref(),
            Self::Id(_) => None,
        }
    }
}

/// The authenticated principal, as returned by the backend.
///
/// Always replaced wholesale by the session controller; never patched field by
/// field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: EntityId,
    pub role: Role,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<OrganizationRef>,
}

impl User {
    /// Human-readable name: `"First Last"`, falling back to email, then id.
    #[must_use]
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if !full.is_empty() {
            return full.to_string();
        }
        self.email
            .as_deref()
            .filter(|email| !email.is_empty())
            .map_or_else(|| format!("user {}", self.id), str::to_string)
    }

    #[must_use]
    pub fn organization_slug(&self) -> Option<&str> {
        self.organization.as_ref().and_then(OrganizationRef::slug)
    }

    /// Dashboard this user should see.
    #[must_use]
    pub const fn view(&self) -> ViewId {
        dispatch(&self.role)
    }
}
