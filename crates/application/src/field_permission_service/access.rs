use std::str::FromStr;

use super::*;

use fieldward_domain::{FieldAction, FieldId};

use crate::FieldResolution;

/// Caller's role for a table and the resolved permission of every field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldAccess {
    /// Role the identity collaborator reported for the caller.
    pub role: Role,
    /// Resolutions in schema order.
    pub fields: Vec<FieldResolution>,
}

impl FieldPermissionService {
    /// Answers whether `role` may perform `action` on a field.
    ///
    /// Inputs arrive as transport strings and are parsed at this boundary.
    /// The caller must hold some role on the table.
    pub async fn check_permission(
        &self,
        actor: &UserIdentity,
        table_id: &TableId,
        field_id: &str,
        role: &str,
        action: &str,
    ) -> AppResult<bool> {
        let role = Role::from_str(role)?;
        let action = FieldAction::from_str(action)?;
        let field_id = FieldId::new(field_id)?;
        self.actor_role(actor, table_id).await?;

        self.resolver
            .resolve(actor.tenant_id(), table_id, &field_id, role, action)
            .await
    }

    /// Resolves every field of the table for the caller's own role.
    pub async fn actor_field_access(
        &self,
        actor: &UserIdentity,
        table_id: &TableId,
    ) -> AppResult<FieldAccess> {
        let role = self.actor_role(actor, table_id).await?;
        let fields = self
            .resolver
            .resolve_all(actor.tenant_id(), table_id, role)
            .await?;

        Ok(FieldAccess { role, fields })
    }

    /// Answers whether the caller may perform `action` on a field.
    pub async fn check_actor_permission(
        &self,
        actor: &UserIdentity,
        table_id: &TableId,
        field_id: &FieldId,
        action: FieldAction,
    ) -> AppResult<bool> {
        let role = self.actor_role(actor, table_id).await?;

        self.resolver
            .resolve(actor.tenant_id(), table_id, field_id, role, action)
            .await
    }
}
