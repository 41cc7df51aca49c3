use fieldward_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::{FieldId, PermissionFlags, Role, TableId};

/// Explicit permission flags stored for one (table, field, role) triple.
///
/// Construction rejects protected roles, so a value of this type can always be
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOverride {
    table_id: TableId,
    field_id: FieldId,
    role: Role,
    flags: PermissionFlags,
}

impl FieldOverride {
    /// Creates an override for a non-protected role.
    pub fn new(
        table_id: TableId,
        field_id: FieldId,
        role: Role,
        flags: PermissionFlags,
    ) -> AppResult<Self> {
        if role.is_protected() {
            return Err(AppError::ProtectedRole(format!(
                "role '{role}' always holds full permissions and cannot be overridden for field '{field_id}' in table '{table_id}'"
            )));
        }

        Ok(Self {
            table_id,
            field_id,
            role,
            flags,
        })
    }

    /// Returns the owning table.
    #[must_use]
    pub fn table_id(&self) -> &TableId {
        &self.table_id
    }

    /// Returns the overridden field.
    #[must_use]
    pub fn field_id(&self) -> &FieldId {
        &self.field_id
    }

    /// Returns the overridden role.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the stored flags.
    #[must_use]
    pub fn flags(&self) -> PermissionFlags {
        self.flags
    }
}

/// Unvalidated override change as submitted by a caller.
///
/// Role and field arrive as raw strings so that batch validation can report
/// every offending entry instead of failing on the first parse error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldPermissionChange {
    /// Field identifier.
    pub field_id: String,
    /// Role name.
    pub role: String,
    /// Requested flags.
    pub flags: PermissionFlags,
}

impl FieldPermissionChange {
    /// Creates a change from raw parts.
    #[must_use]
    pub fn new(
        field_id: impl Into<String>,
        role: impl Into<String>,
        flags: PermissionFlags,
    ) -> Self {
        Self {
            field_id: field_id.into(),
            role: role.into(),
            flags,
        }
    }
}

#[cfg(test)]
mod tests {
    use fieldward_core::AppError;

    use super::FieldOverride;
    use crate::{FieldId, PermissionFlags, Role, TableId};

    fn ids() -> (TableId, FieldId) {
        match (TableId::new("tbl_people"), FieldId::new("fld_salary")) {
            (Ok(table_id), Ok(field_id)) => (table_id, field_id),
            _ => panic!("fixture identifiers must be valid"),
        }
    }

    #[test]
    fn protected_roles_cannot_be_overridden() {
        for role in [Role::Owner, Role::Admin] {
            let (table_id, field_id) = ids();
            let result = FieldOverride::new(table_id, field_id, role, PermissionFlags::none());
            assert!(matches!(result, Err(AppError::ProtectedRole(_))));
        }
    }

    #[test]
    fn non_protected_override_keeps_flags() {
        let (table_id, field_id) = ids();
        let flags = PermissionFlags::new(true, false, false);
        let result = FieldOverride::new(table_id, field_id, Role::Viewer, flags);
        assert!(matches!(result, Ok(value) if value.flags() == flags && value.role() == Role::Viewer));
    }
}
