use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use fieldward_core::{AppError, AppResult, TenantId, ValidationIssue, ValidationIssueKind};
use fieldward_domain::{
    FieldId, FieldOverride, FieldPermissionChange, PermissionFlags, Role, TableId,
};

use crate::store_timeout::bounded;
use crate::{FieldOverrideEntry, FieldOverrideRepository, TableSchemaProvider};

/// Validating facade over the override repository and the schema collaborator.
///
/// Every call is bounded by the configured store timeout.
#[derive(Clone)]
pub struct FieldOverrideStore {
    repository: Arc<dyn FieldOverrideRepository>,
    schema_provider: Arc<dyn TableSchemaProvider>,
    timeout: Duration,
}

impl FieldOverrideStore {
    /// Creates a store from its ports.
    #[must_use]
    pub fn new(
        repository: Arc<dyn FieldOverrideRepository>,
        schema_provider: Arc<dyn TableSchemaProvider>,
        timeout: Duration,
    ) -> Self {
        Self {
            repository,
            schema_provider,
            timeout,
        }
    }

    /// Returns all overrides configured for a table. Empty when none exist.
    pub async fn load(
        &self,
        tenant_id: TenantId,
        table_id: &TableId,
    ) -> AppResult<Vec<FieldOverrideEntry>> {
        bounded(
            self.timeout,
            "loading field overrides",
            self.repository.list_overrides(tenant_id, table_id),
        )
        .await
    }

    /// Validates and writes a single override, replacing any prior value.
    pub async fn upsert(
        &self,
        tenant_id: TenantId,
        table_id: &TableId,
        field_id: &str,
        role: &str,
        flags: PermissionFlags,
    ) -> AppResult<FieldOverride> {
        let role = Role::from_str(role)?;
        let field_id = FieldId::new(field_id)?;
        let field_override = FieldOverride::new(table_id.clone(), field_id, role, flags)?;

        if !self
            .field_exists(tenant_id, table_id, field_override.field_id())
            .await?
        {
            return Err(AppError::UnknownField(format!(
                "field '{}' does not exist in table '{table_id}'",
                field_override.field_id()
            )));
        }

        self.upsert_many(tenant_id, table_id, std::slice::from_ref(&field_override))
            .await?;

        Ok(field_override)
    }

    /// Validates every change and returns the typed overrides.
    ///
    /// All entries are checked before returning; a failure reports every
    /// offending entry in one `ValidationFailed` error.
    pub async fn validate_changes(
        &self,
        tenant_id: TenantId,
        table_id: &TableId,
        changes: &[FieldPermissionChange],
    ) -> AppResult<Vec<FieldOverride>> {
        let known_fields: HashSet<FieldId> = self
            .list_fields(tenant_id, table_id)
            .await?
            .into_iter()
            .collect();

        let mut issues = Vec::new();
        let mut overrides = Vec::with_capacity(changes.len());

        for (index, change) in changes.iter().enumerate() {
            let issue = |kind| ValidationIssue::new(index, &change.field_id, &change.role, kind);

            let role = match Role::from_str(change.role.as_str()) {
                Ok(role) if role.is_protected() => {
                    issues.push(issue(ValidationIssueKind::ProtectedRole));
                    None
                }
                Ok(role) => Some(role),
                Err(_) => {
                    issues.push(issue(ValidationIssueKind::InvalidRole));
                    None
                }
            };

            let field_id = match FieldId::new(change.field_id.as_str()) {
                Ok(field_id) if known_fields.contains(&field_id) => Some(field_id),
                Ok(_) => {
                    issues.push(issue(ValidationIssueKind::UnknownField));
                    None
                }
                Err(_) => {
                    issues.push(issue(ValidationIssueKind::InvalidField));
                    None
                }
            };

            if let (Some(role), Some(field_id)) = (role, field_id) {
                overrides.push(FieldOverride::new(
                    table_id.clone(),
                    field_id,
                    role,
                    change.flags,
                )?);
            }
        }

        if !issues.is_empty() {
            return Err(AppError::ValidationFailed(issues));
        }

        Ok(overrides)
    }

    /// Writes already validated overrides in one transaction.
    pub async fn upsert_many(
        &self,
        tenant_id: TenantId,
        table_id: &TableId,
        overrides: &[FieldOverride],
    ) -> AppResult<()> {
        if overrides.is_empty() {
            return Ok(());
        }

        bounded(
            self.timeout,
            "writing field overrides",
            self.repository.upsert_overrides(tenant_id, table_id, overrides),
        )
        .await
    }

    /// Deletes every override of a table.
    pub async fn remove_all(&self, tenant_id: TenantId, table_id: &TableId) -> AppResult<u64> {
        bounded(
            self.timeout,
            "removing table overrides",
            self.repository.delete_table_overrides(tenant_id, table_id),
        )
        .await
    }

    /// Deletes the overrides of one field across all roles.
    pub async fn remove_field(
        &self,
        tenant_id: TenantId,
        table_id: &TableId,
        field_id: &FieldId,
    ) -> AppResult<u64> {
        bounded(
            self.timeout,
            "removing field overrides",
            self.repository.delete_field_overrides(tenant_id, table_id, field_id),
        )
        .await
    }

    /// Lists the table's fields from the schema collaborator.
    pub async fn list_fields(
        &self,
        tenant_id: TenantId,
        table_id: &TableId,
    ) -> AppResult<Vec<FieldId>> {
        bounded(
            self.timeout,
            "listing table fields",
            self.schema_provider.list_field_ids(tenant_id, table_id),
        )
        .await
    }

    /// Returns whether a field belongs to the table.
    pub async fn field_exists(
        &self,
        tenant_id: TenantId,
        table_id: &TableId,
        field_id: &FieldId,
    ) -> AppResult<bool> {
        bounded(
            self.timeout,
            "checking field existence",
            self.schema_provider
                .field_exists(tenant_id, table_id, field_id),
        )
        .await
    }
}
