use std::fmt::{Display, Formatter};
use std::str::FromStr;

use fieldward_core::AppError;
use serde::{Deserialize, Serialize};

use crate::Role;

/// Record-level action gated per field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldAction {
    /// See the field value.
    Read,
    /// Change the field value.
    Write,
    /// Clear the field value when deleting record content.
    Delete,
}

impl FieldAction {
    /// Returns a stable transport value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Delete => "delete",
        }
    }

    /// Returns all actions.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[FieldAction] = &[FieldAction::Read, FieldAction::Write, FieldAction::Delete];

        ALL
    }
}

impl FromStr for FieldAction {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "read" => Ok(Self::Read),
            "write" => Ok(Self::Write),
            "delete" => Ok(Self::Delete),
            _ => Err(AppError::Validation(format!(
                "unknown field action '{value}', expected one of read, write, delete"
            ))),
        }
    }
}

impl Display for FieldAction {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Read/write/delete flags for one (field, role) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermissionFlags {
    /// Read access.
    pub can_read: bool,
    /// Write access.
    pub can_write: bool,
    /// Delete access.
    pub can_delete: bool,
}

impl PermissionFlags {
    /// Creates flags from explicit values.
    #[must_use]
    pub const fn new(can_read: bool, can_write: bool, can_delete: bool) -> Self {
        Self {
            can_read,
            can_write,
            can_delete,
        }
    }

    /// All actions allowed.
    #[must_use]
    pub const fn full() -> Self {
        Self::new(true, true, true)
    }

    /// All actions denied.
    #[must_use]
    pub const fn none() -> Self {
        Self::new(false, false, false)
    }

    /// Returns the flag for `action`.
    #[must_use]
    pub fn allows(&self, action: FieldAction) -> bool {
        match action {
            FieldAction::Read => self.can_read,
            FieldAction::Write => self.can_write,
            FieldAction::Delete => self.can_delete,
        }
    }

    /// Returns a copy with the flag for `action` replaced.
    #[must_use]
    pub fn with(mut self, action: FieldAction, allowed: bool) -> Self {
        match action {
            FieldAction::Read => self.can_read = allowed,
            FieldAction::Write => self.can_write = allowed,
            FieldAction::Delete => self.can_delete = allowed,
        }
        self
    }
}

/// Built-in per-role permissions used when a field has no override.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultPolicy;

impl DefaultPolicy {
    /// Returns the default flags for a known role.
    #[must_use]
    pub const fn for_role(role: Role) -> PermissionFlags {
        match role {
            Role::Owner | Role::Admin => PermissionFlags::full(),
            Role::Editor => PermissionFlags::new(true, true, false),
            Role::Viewer => PermissionFlags::new(true, false, false),
        }
    }

    /// Returns the default flags for a raw role name.
    ///
    /// Names outside the role enumeration resolve to no access instead of an
    /// error so that a fallback decision always exists.
    #[must_use]
    pub fn for_role_name(role: &str) -> PermissionFlags {
        Role::from_str(role)
            .map(Self::for_role)
            .unwrap_or(PermissionFlags::none())
    }

    /// Returns the default decision for one role and action.
    #[must_use]
    pub fn allows(role: Role, action: FieldAction) -> bool {
        Self::for_role(role).allows(action)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::{DefaultPolicy, FieldAction, PermissionFlags};
    use crate::Role;

    #[test]
    fn default_policy_matches_table() {
        assert_eq!(DefaultPolicy::for_role(Role::Owner), PermissionFlags::full());
        assert_eq!(DefaultPolicy::for_role(Role::Admin), PermissionFlags::full());
        assert_eq!(
            DefaultPolicy::for_role(Role::Editor),
            PermissionFlags::new(true, true, false)
        );
        assert_eq!(
            DefaultPolicy::for_role(Role::Viewer),
            PermissionFlags::new(true, false, false)
        );
    }

    #[test]
    fn unrecognized_role_name_defaults_to_no_access() {
        assert_eq!(
            DefaultPolicy::for_role_name("member"),
            PermissionFlags::none()
        );
        assert_eq!(DefaultPolicy::for_role_name(""), PermissionFlags::none());
        assert_eq!(
            DefaultPolicy::for_role_name("editor"),
            DefaultPolicy::for_role(Role::Editor)
        );
    }

    #[test]
    fn with_replaces_only_the_requested_action() {
        let flags = PermissionFlags::new(true, false, false).with(FieldAction::Delete, true);
        assert_eq!(flags, PermissionFlags::new(true, false, true));
    }

    fn any_role() -> impl Strategy<Value = Role> {
        prop::sample::select(Role::all().to_vec())
    }

    fn any_action() -> impl Strategy<Value = FieldAction> {
        prop::sample::select(FieldAction::all().to_vec())
    }

    proptest! {
        #[test]
        fn protected_roles_default_to_every_action(role in any_role(), action in any_action()) {
            if role.is_protected() {
                prop_assert!(DefaultPolicy::allows(role, action));
            }
        }

        #[test]
        fn higher_roles_never_have_fewer_defaults(
            left in any_role(),
            right in any_role(),
            action in any_action(),
        ) {
            if left >= right && DefaultPolicy::allows(right, action) {
                prop_assert!(DefaultPolicy::allows(left, action));
            }
        }

        #[test]
        fn non_role_names_never_grant_access(name in "[a-z]{1,12}", action in any_action()) {
            prop_assume!(!Role::is_valid(name.as_str()));
            prop_assert!(!DefaultPolicy::for_role_name(name.as_str()).allows(action));
        }
    }
}
