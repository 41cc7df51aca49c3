use std::sync::Arc;
use std::time::Duration;

use fieldward_core::{AppError, AppResult, TenantId, UserIdentity};
use fieldward_domain::{AuditAction, Role, TableId};

use crate::store_timeout::{DEFAULT_STORE_TIMEOUT, bounded};
use crate::{
    AuditEvent, AuditRepository, BatchMutator, FieldOverrideRepository, FieldOverrideStore,
    PermissionCache, PermissionResolver, TableRoleProvider, TableSchemaProvider,
};

mod access;
mod configuration;

pub use access::FieldAccess;

const AUDIT_RESOURCE_TYPE: &str = "field_permission";

/// Tunables for the field permission service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPermissionConfig {
    /// Upper bound for every store and collaborator call.
    pub store_timeout: Duration,
}

impl Default for FieldPermissionConfig {
    fn default() -> Self {
        Self {
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }
}

/// Application service behind the field permission boundary operations.
#[derive(Clone)]
pub struct FieldPermissionService {
    cache: PermissionCache,
    resolver: PermissionResolver,
    mutator: BatchMutator,
    role_provider: Arc<dyn TableRoleProvider>,
    audit_repository: Arc<dyn AuditRepository>,
    store_timeout: Duration,
}

impl FieldPermissionService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        repository: Arc<dyn FieldOverrideRepository>,
        schema_provider: Arc<dyn TableSchemaProvider>,
        role_provider: Arc<dyn TableRoleProvider>,
        audit_repository: Arc<dyn AuditRepository>,
        config: FieldPermissionConfig,
    ) -> Self {
        let store = FieldOverrideStore::new(repository, schema_provider, config.store_timeout);
        let cache = PermissionCache::new(store.clone());

        Self {
            resolver: PermissionResolver::new(cache.clone(), store.clone()),
            mutator: BatchMutator::new(store, cache.clone()),
            cache,
            role_provider,
            audit_repository,
            store_timeout: config.store_timeout,
        }
    }

    /// Drops every cached snapshot when the caller's session ends.
    pub fn end_session(&self) {
        self.cache.invalidate_all();
    }

    async fn actor_role(&self, actor: &UserIdentity, table_id: &TableId) -> AppResult<Role> {
        let role = bounded(
            self.store_timeout,
            "looking up table role",
            self.role_provider
                .role_for_subject(actor.tenant_id(), table_id, actor.subject()),
        )
        .await?;

        role.ok_or_else(|| {
            AppError::Forbidden(format!(
                "subject '{}' has no role in table '{table_id}'",
                actor.subject()
            ))
        })
    }

    async fn require_manage(&self, actor: &UserIdentity, table_id: &TableId) -> AppResult<()> {
        let role = self.actor_role(actor, table_id).await?;
        if role.is_protected() {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "subject '{}' with role '{role}' cannot manage field permissions of table '{table_id}'",
            actor.subject()
        )))
    }

    async fn audit(
        &self,
        tenant_id: TenantId,
        actor: &UserIdentity,
        action: AuditAction,
        resource_id: String,
        detail: String,
    ) -> AppResult<()> {
        self.audit_repository
            .append_event(AuditEvent {
                tenant_id,
                subject: actor.subject().to_owned(),
                action,
                resource_type: AUDIT_RESOURCE_TYPE.to_owned(),
                resource_id,
                detail: Some(detail),
            })
            .await
    }
}
