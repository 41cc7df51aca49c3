use std::fmt::{Display, Formatter};
use std::str::FromStr;

use fieldward_core::AppError;
use serde::{Deserialize, Serialize};

/// Collaborator standing with respect to a table.
///
/// Variants are declared from least to most privileged so the derived
/// ordering matches the role hierarchy (`Viewer < Editor < Admin < Owner`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Read-only collaborator.
    Viewer,
    /// Collaborator allowed to edit record values.
    Editor,
    /// Table administrator. Protected.
    Admin,
    /// Table owner. Protected.
    Owner,
}

impl Role {
    /// Returns a stable storage value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Viewer => "viewer",
            Self::Editor => "editor",
            Self::Admin => "admin",
            Self::Owner => "owner",
        }
    }

    /// Returns all roles, most privileged first.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Role] = &[Role::Owner, Role::Admin, Role::Editor, Role::Viewer];

        ALL
    }

    /// Returns the roles that may carry field overrides, most privileged first.
    #[must_use]
    pub fn overridable() -> &'static [Self] {
        const OVERRIDABLE: &[Role] = &[Role::Editor, Role::Viewer];

        OVERRIDABLE
    }

    /// Protected roles always hold full permissions and ignore overrides.
    #[must_use]
    pub fn is_protected(&self) -> bool {
        matches!(self, Self::Owner | Self::Admin)
    }

    /// Returns whether `value` names one of the four roles.
    #[must_use]
    pub fn is_valid(value: &str) -> bool {
        Self::from_str(value).is_ok()
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "owner" => Ok(Self::Owner),
            "admin" => Ok(Self::Admin),
            "editor" => Ok(Self::Editor),
            "viewer" => Ok(Self::Viewer),
            _ => Err(AppError::InvalidRole(format!(
                "unknown role value '{value}', expected one of owner, admin, editor, viewer"
            ))),
        }
    }
}

impl Display for Role {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}
