use super::*;

use fieldward_domain::{
    FieldAction, FieldId, FieldOverride, FieldPermissionChange, PermissionTemplate,
};

use crate::FieldOverrideEntry;

impl FieldPermissionService {
    /// Returns the table's stored overrides only, without defaults.
    pub async fn get_field_permissions(
        &self,
        actor: &UserIdentity,
        table_id: &TableId,
    ) -> AppResult<Vec<FieldOverrideEntry>> {
        self.require_manage(actor, table_id).await?;

        let overrides = self.cache.get(actor.tenant_id(), table_id).await?;
        Ok(overrides.entries().to_vec())
    }

    /// Writes one override and emits an audit event.
    pub async fn set_field_permission(
        &self,
        actor: &UserIdentity,
        table_id: &TableId,
        change: FieldPermissionChange,
    ) -> AppResult<FieldOverride> {
        self.require_manage(actor, table_id).await?;

        let field_override = self
            .mutator
            .apply_one(
                actor.tenant_id(),
                table_id,
                &change.field_id,
                &change.role,
                change.flags,
            )
            .await?;

        let flags = field_override.flags();
        self.audit(
            actor.tenant_id(),
            actor,
            AuditAction::FieldPermissionSet,
            format!(
                "{table_id}:{}:{}",
                field_override.field_id(),
                field_override.role()
            ),
            format!(
                "set read={} write={} delete={}",
                flags.can_read, flags.can_write, flags.can_delete
            ),
        )
        .await?;

        Ok(field_override)
    }

    /// Writes a batch of overrides atomically and emits an audit event.
    pub async fn batch_set_field_permissions(
        &self,
        actor: &UserIdentity,
        table_id: &TableId,
        changes: &[FieldPermissionChange],
    ) -> AppResult<Vec<FieldOverride>> {
        self.require_manage(actor, table_id).await?;

        let overrides = self
            .mutator
            .apply_batch(actor.tenant_id(), table_id, changes)
            .await?;
        if overrides.is_empty() {
            return Ok(overrides);
        }

        self.audit(
            actor.tenant_id(),
            actor,
            AuditAction::FieldPermissionsBatchSet,
            table_id.to_string(),
            format!("wrote {} field overrides", overrides.len()),
        )
        .await?;

        Ok(overrides)
    }

    /// Removes every override of the table and emits an audit event.
    pub async fn reset_field_permissions(
        &self,
        actor: &UserIdentity,
        table_id: &TableId,
    ) -> AppResult<u64> {
        self.require_manage(actor, table_id).await?;

        let removed = self
            .mutator
            .reset_to_default(actor.tenant_id(), table_id)
            .await?;

        self.audit(
            actor.tenant_id(),
            actor,
            AuditAction::FieldPermissionsReset,
            table_id.to_string(),
            format!("removed {removed} field overrides"),
        )
        .await?;

        Ok(removed)
    }

    /// Writes explicit denials for the selected roles and emits an audit event.
    pub async fn clear_field_permissions(
        &self,
        actor: &UserIdentity,
        table_id: &TableId,
        roles: &[Role],
    ) -> AppResult<Vec<FieldOverride>> {
        self.require_manage(actor, table_id).await?;

        let overrides = self
            .mutator
            .clear_all(actor.tenant_id(), table_id, roles)
            .await?;
        if overrides.is_empty() {
            return Ok(overrides);
        }

        self.audit(
            actor.tenant_id(),
            actor,
            AuditAction::FieldPermissionsCleared,
            table_id.to_string(),
            format!("cleared {} field overrides", overrides.len()),
        )
        .await?;

        Ok(overrides)
    }

    /// Applies a permission template and emits an audit event.
    pub async fn apply_permission_template(
        &self,
        actor: &UserIdentity,
        table_id: &TableId,
        template: PermissionTemplate,
    ) -> AppResult<Vec<FieldOverride>> {
        self.require_manage(actor, table_id).await?;

        let overrides = self
            .mutator
            .apply_template(actor.tenant_id(), table_id, template)
            .await?;

        self.audit(
            actor.tenant_id(),
            actor,
            AuditAction::FieldPermissionsTemplateApplied,
            table_id.to_string(),
            format!("applied template '{}'", template.as_str()),
        )
        .await?;

        Ok(overrides)
    }

    /// Sets one action for a role on every field and emits an audit event.
    pub async fn set_action_for_all_fields(
        &self,
        actor: &UserIdentity,
        table_id: &TableId,
        role: Role,
        action: FieldAction,
        allowed: bool,
    ) -> AppResult<Vec<FieldOverride>> {
        self.require_manage(actor, table_id).await?;

        let overrides = self
            .mutator
            .set_action_for_all_fields(actor.tenant_id(), table_id, role, action, allowed)
            .await?;

        self.audit(
            actor.tenant_id(),
            actor,
            AuditAction::FieldPermissionsBatchSet,
            table_id.to_string(),
            format!("set {action}={allowed} for role '{role}' on every field"),
        )
        .await?;

        Ok(overrides)
    }

    /// Removes the overrides of a deleted field and emits an audit event.
    pub async fn remove_field_permissions(
        &self,
        actor: &UserIdentity,
        table_id: &TableId,
        field_id: &FieldId,
    ) -> AppResult<u64> {
        self.require_manage(actor, table_id).await?;

        let removed = self
            .mutator
            .remove_field(actor.tenant_id(), table_id, field_id)
            .await?;

        self.audit(
            actor.tenant_id(),
            actor,
            AuditAction::FieldPermissionsFieldRemoved,
            format!("{table_id}:{field_id}"),
            format!("removed {removed} field overrides"),
        )
        .await?;

        Ok(removed)
    }
}
