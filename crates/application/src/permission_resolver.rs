use std::collections::HashSet;
use std::sync::Arc;

use fieldward_core::{AppError, AppResult, TenantId};
use fieldward_domain::{DefaultPolicy, FieldAction, FieldId, PermissionFlags, Role, TableId};

use crate::{FieldOverrideStore, PermissionCache, TableOverrides};

/// Tier that produced a resolved permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    /// Role is protected and always fully permitted.
    Protected,
    /// An explicit override for the field and role.
    Override,
    /// The built-in default policy for the role.
    Default,
}

impl ResolutionSource {
    /// Returns a stable transport value for this source.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Protected => "protected",
            Self::Override => "override",
            Self::Default => "default",
        }
    }
}

/// Effective flags for one (field, role) pair and the tier that decided them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedPermission {
    /// Effective flags.
    pub flags: PermissionFlags,
    /// Winning tier.
    pub source: ResolutionSource,
}

impl ResolvedPermission {
    /// Returns the decision for `action`.
    #[must_use]
    pub fn allows(&self, action: FieldAction) -> bool {
        self.flags.allows(action)
    }
}

/// Resolved permission of one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldResolution {
    /// Field identifier.
    pub field_id: FieldId,
    /// Resolved permission for the queried role.
    pub permission: ResolvedPermission,
}

/// Answers point and bulk field permission queries.
#[derive(Clone)]
pub struct PermissionResolver {
    cache: PermissionCache,
    store: FieldOverrideStore,
}

impl PermissionResolver {
    /// Creates a resolver reading overrides through `cache`.
    #[must_use]
    pub fn new(cache: PermissionCache, store: FieldOverrideStore) -> Self {
        Self { cache, store }
    }

    /// Applies the layered rule to one snapshot.
    ///
    /// Protected roles win first, then an explicit override, then the default
    /// policy. Exactly one tier decides.
    #[must_use]
    pub fn resolve_in(
        overrides: &TableOverrides,
        field_id: &FieldId,
        role: Role,
    ) -> ResolvedPermission {
        if role.is_protected() {
            return ResolvedPermission {
                flags: PermissionFlags::full(),
                source: ResolutionSource::Protected,
            };
        }

        match overrides.flags_for(field_id, role) {
            Some(flags) => ResolvedPermission {
                flags,
                source: ResolutionSource::Override,
            },
            None => ResolvedPermission {
                flags: DefaultPolicy::for_role(role),
                source: ResolutionSource::Default,
            },
        }
    }

    /// Returns whether `role` may perform `action` on the field.
    pub async fn resolve(
        &self,
        tenant_id: TenantId,
        table_id: &TableId,
        field_id: &FieldId,
        role: Role,
        action: FieldAction,
    ) -> AppResult<bool> {
        Ok(self
            .resolve_permission(tenant_id, table_id, field_id, role)
            .await?
            .allows(action))
    }

    /// Returns the resolved flags for one field and role.
    pub async fn resolve_permission(
        &self,
        tenant_id: TenantId,
        table_id: &TableId,
        field_id: &FieldId,
        role: Role,
    ) -> AppResult<ResolvedPermission> {
        if !self.store.field_exists(tenant_id, table_id, field_id).await? {
            return Err(unknown_field(table_id, field_id));
        }

        if role.is_protected() {
            return Ok(Self::resolve_in(&TableOverrides::default(), field_id, role));
        }

        let overrides = self.cache.get(tenant_id, table_id).await?;
        Ok(Self::resolve_in(&overrides, field_id, role))
    }

    /// Resolves every field of the table for `role`, in schema order.
    pub async fn resolve_all(
        &self,
        tenant_id: TenantId,
        table_id: &TableId,
        role: Role,
    ) -> AppResult<Vec<FieldResolution>> {
        let fields = self.store.list_fields(tenant_id, table_id).await?;
        let overrides = self.snapshot_for(tenant_id, table_id, role).await?;

        Ok(fields
            .into_iter()
            .map(|field_id| {
                let permission = Self::resolve_in(&overrides, &field_id, role);
                FieldResolution {
                    field_id,
                    permission,
                }
            })
            .collect())
    }

    /// Lists the fields `role` may see at all, in schema order.
    pub async fn visible_fields(
        &self,
        tenant_id: TenantId,
        table_id: &TableId,
        role: Role,
    ) -> AppResult<Vec<FieldId>> {
        Ok(self
            .resolve_all(tenant_id, table_id, role)
            .await?
            .into_iter()
            .filter(|resolution| resolution.permission.allows(FieldAction::Read))
            .map(|resolution| resolution.field_id)
            .collect())
    }

    /// Keeps the fields on which `role` may perform `action`, preserving order.
    pub async fn filter_fields(
        &self,
        tenant_id: TenantId,
        table_id: &TableId,
        fields: &[FieldId],
        role: Role,
        action: FieldAction,
    ) -> AppResult<Vec<FieldId>> {
        let known_fields: HashSet<FieldId> = self
            .store
            .list_fields(tenant_id, table_id)
            .await?
            .into_iter()
            .collect();
        if let Some(unknown) = fields.iter().find(|field_id| !known_fields.contains(*field_id)) {
            return Err(unknown_field(table_id, unknown));
        }

        let overrides = self.snapshot_for(tenant_id, table_id, role).await?;
        Ok(fields
            .iter()
            .filter(|field_id| Self::resolve_in(&overrides, field_id, role).allows(action))
            .cloned()
            .collect())
    }

    async fn snapshot_for(
        &self,
        tenant_id: TenantId,
        table_id: &TableId,
        role: Role,
    ) -> AppResult<Arc<TableOverrides>> {
        if role.is_protected() {
            return Ok(Arc::default());
        }

        self.cache.get(tenant_id, table_id).await
    }
}

fn unknown_field(table_id: &TableId, field_id: &FieldId) -> AppError {
    AppError::UnknownField(format!(
        "field '{field_id}' does not exist in table '{table_id}'"
    ))
}
