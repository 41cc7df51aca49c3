use std::collections::HashMap;
use std::sync::Arc;

use fieldward_core::{AppError, AppResult, TenantId};
use fieldward_domain::{
    FieldAction, FieldId, FieldOverride, FieldPermissionChange, PermissionFlags,
    PermissionTemplate, Role, TableId,
};
use tokio::sync::Mutex;
use tracing::info;

use crate::{FieldOverrideStore, PermissionCache, PermissionResolver, TableOverrides};

/// Applies override changes as single units and invalidates the cache.
///
/// Every write path holds an invalidation guard across the store call, so the
/// table's cache entry is dropped before control returns to the caller even
/// when the write fails or the caller stops polling.
///
/// Writes from clones of one mutator are serialized, so a read-modify-write
/// such as [`BatchMutator::set_action_for_all_fields`] never overwrites a
/// concurrent change with stale flags.
#[derive(Clone)]
pub struct BatchMutator {
    store: FieldOverrideStore,
    cache: PermissionCache,
    write_lock: Arc<Mutex<()>>,
}

impl BatchMutator {
    /// Creates a mutator writing through `store` and invalidating `cache`.
    #[must_use]
    pub fn new(store: FieldOverrideStore, cache: PermissionCache) -> Self {
        Self {
            store,
            cache,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Validates and writes one override.
    pub async fn apply_one(
        &self,
        tenant_id: TenantId,
        table_id: &TableId,
        field_id: &str,
        role: &str,
        flags: PermissionFlags,
    ) -> AppResult<FieldOverride> {
        let _serialized = self.write_lock.lock().await;
        let _invalidation = self.cache.invalidate_on_drop(tenant_id, table_id);
        let field_override = self
            .store
            .upsert(tenant_id, table_id, field_id, role, flags)
            .await?;

        info!(
            tenant_id = %tenant_id,
            table_id = %table_id,
            field_id = %field_override.field_id(),
            role = %field_override.role(),
            "field override written"
        );
        Ok(field_override)
    }

    /// Validates every change, then writes all of them or none.
    ///
    /// Later entries for the same (field, role) replace earlier ones.
    pub async fn apply_batch(
        &self,
        tenant_id: TenantId,
        table_id: &TableId,
        changes: &[FieldPermissionChange],
    ) -> AppResult<Vec<FieldOverride>> {
        let overrides = collapse_duplicates(
            self.store
                .validate_changes(tenant_id, table_id, changes)
                .await?,
        );

        self.write(tenant_id, table_id, overrides).await
    }

    /// Removes every override so the table falls back to the default policy.
    pub async fn reset_to_default(
        &self,
        tenant_id: TenantId,
        table_id: &TableId,
    ) -> AppResult<u64> {
        let _serialized = self.write_lock.lock().await;
        let _invalidation = self.cache.invalidate_on_drop(tenant_id, table_id);
        let removed = self.store.remove_all(tenant_id, table_id).await?;

        info!(tenant_id = %tenant_id, table_id = %table_id, removed, "field overrides reset");
        Ok(removed)
    }

    /// Writes explicit all-false overrides for every field.
    ///
    /// Applies to the given roles, or to every non-protected role when `roles`
    /// is empty. Protected roles are skipped.
    pub async fn clear_all(
        &self,
        tenant_id: TenantId,
        table_id: &TableId,
        roles: &[Role],
    ) -> AppResult<Vec<FieldOverride>> {
        let roles: Vec<Role> = if roles.is_empty() {
            Role::overridable().to_vec()
        } else {
            Role::overridable()
                .iter()
                .copied()
                .filter(|role| roles.contains(role))
                .collect()
        };

        let fields = self.store.list_fields(tenant_id, table_id).await?;
        let overrides = overrides_for(table_id, &fields, &roles, |_, _| {
            Some(PermissionFlags::none())
        })?;

        self.write(tenant_id, table_id, overrides).await
    }

    /// Writes the template's flags for every field and non-protected role.
    pub async fn apply_template(
        &self,
        tenant_id: TenantId,
        table_id: &TableId,
        template: PermissionTemplate,
    ) -> AppResult<Vec<FieldOverride>> {
        let fields = self.store.list_fields(tenant_id, table_id).await?;
        let overrides = overrides_for(table_id, &fields, Role::overridable(), |_, role| {
            template.flags_for(role)
        })?;

        self.write(tenant_id, table_id, overrides).await
    }

    /// Sets one action for `role` on every field, keeping the other flags.
    ///
    /// The current flags are read from the store while holding the write lock.
    pub async fn set_action_for_all_fields(
        &self,
        tenant_id: TenantId,
        table_id: &TableId,
        role: Role,
        action: FieldAction,
        allowed: bool,
    ) -> AppResult<Vec<FieldOverride>> {
        if role.is_protected() {
            return Err(AppError::ProtectedRole(format!(
                "role '{role}' always holds full permissions in table '{table_id}'"
            )));
        }

        let _serialized = self.write_lock.lock().await;
        let fields = self.store.list_fields(tenant_id, table_id).await?;
        let current = TableOverrides::from_entries(self.store.load(tenant_id, table_id).await?);
        let overrides = overrides_for(table_id, &fields, &[role], |field_id, role| {
            let flags = PermissionResolver::resolve_in(&current, field_id, role).flags;
            Some(flags.with(action, allowed))
        })?;

        self.write_serialized(tenant_id, table_id, overrides).await
    }

    /// Removes the overrides of a field deleted by the schema collaborator.
    pub async fn remove_field(
        &self,
        tenant_id: TenantId,
        table_id: &TableId,
        field_id: &FieldId,
    ) -> AppResult<u64> {
        let _serialized = self.write_lock.lock().await;
        let _invalidation = self.cache.invalidate_on_drop(tenant_id, table_id);
        let removed = self.store.remove_field(tenant_id, table_id, field_id).await?;

        info!(
            tenant_id = %tenant_id,
            table_id = %table_id,
            field_id = %field_id,
            removed,
            "field overrides removed for deleted field"
        );
        Ok(removed)
    }

    async fn write(
        &self,
        tenant_id: TenantId,
        table_id: &TableId,
        overrides: Vec<FieldOverride>,
    ) -> AppResult<Vec<FieldOverride>> {
        let _serialized = self.write_lock.lock().await;
        self.write_serialized(tenant_id, table_id, overrides).await
    }

    // Callers hold `write_lock`.
    async fn write_serialized(
        &self,
        tenant_id: TenantId,
        table_id: &TableId,
        overrides: Vec<FieldOverride>,
    ) -> AppResult<Vec<FieldOverride>> {
        if overrides.is_empty() {
            return Ok(overrides);
        }

        let _invalidation = self.cache.invalidate_on_drop(tenant_id, table_id);
        self.store.upsert_many(tenant_id, table_id, &overrides).await?;

        info!(
            tenant_id = %tenant_id,
            table_id = %table_id,
            count = overrides.len(),
            "field override batch written"
        );
        Ok(overrides)
    }
}

fn overrides_for(
    table_id: &TableId,
    fields: &[FieldId],
    roles: &[Role],
    flags_for: impl Fn(&FieldId, Role) -> Option<PermissionFlags>,
) -> AppResult<Vec<FieldOverride>> {
    let mut overrides = Vec::with_capacity(fields.len() * roles.len());
    for field_id in fields {
        for role in roles.iter().copied().filter(|role| !role.is_protected()) {
            if let Some(flags) = flags_for(field_id, role) {
                overrides.push(FieldOverride::new(
                    table_id.clone(),
                    field_id.clone(),
                    role,
                    flags,
                )?);
            }
        }
    }

    Ok(overrides)
}

fn collapse_duplicates(overrides: Vec<FieldOverride>) -> Vec<FieldOverride> {
    let mut positions: HashMap<(FieldId, Role), usize> = HashMap::new();
    let mut collapsed: Vec<FieldOverride> = Vec::with_capacity(overrides.len());

    for field_override in overrides {
        let key = (field_override.field_id().clone(), field_override.role());
        match positions.get(&key) {
            Some(position) => collapsed[*position] = field_override,
            None => {
                positions.insert(key, collapsed.len());
                collapsed.push(field_override);
            }
        }
    }

    collapsed
}

#[cfg(test)]
mod tests;
