use std::str::FromStr;

use fieldward_core::AppError;
use serde::{Deserialize, Serialize};

use crate::{PermissionFlags, Role};

/// Preset that writes the same flags to every field of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionTemplate {
    /// Explicit copy of the default policy.
    Default,
    /// Editors and viewers may only read.
    ReadOnly,
    /// Editors may only read, viewers see nothing.
    Strict,
}

impl PermissionTemplate {
    /// Returns a stable transport value for this template.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::ReadOnly => "read_only",
            Self::Strict => "strict",
        }
    }

    /// Returns the flags this template assigns to `role`.
    ///
    /// Returns `None` for protected roles, which templates never touch.
    #[must_use]
    pub fn flags_for(&self, role: Role) -> Option<PermissionFlags> {
        if role.is_protected() {
            return None;
        }

        let flags = match (self, role) {
            (Self::Default, Role::Editor) => PermissionFlags::new(true, true, false),
            (Self::Default, _) => PermissionFlags::new(true, false, false),
            (Self::ReadOnly, _) => PermissionFlags::new(true, false, false),
            (Self::Strict, Role::Editor) => PermissionFlags::new(true, false, false),
            (Self::Strict, _) => PermissionFlags::none(),
        };

        Some(flags)
    }
}

impl FromStr for PermissionTemplate {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "default" => Ok(Self::Default),
            "read_only" => Ok(Self::ReadOnly),
            "strict" => Ok(Self::Strict),
            _ => Err(AppError::Validation(format!(
                "unknown permission template '{value}'"
            ))),
        }
    }
}
