use async_trait::async_trait;

use fieldward_core::{AppResult, TenantId};
use fieldward_domain::{FieldId, FieldOverride, Role, TableId};

use super::entries::FieldOverrideEntry;

/// Persistence port for field permission overrides.
///
/// Implementations receive already validated overrides; they only guarantee
/// durability and atomicity.
#[async_trait]
pub trait FieldOverrideRepository: Send + Sync {
    /// Lists every override stored for a table, ordered by field then role.
    async fn list_overrides(
        &self,
        tenant_id: TenantId,
        table_id: &TableId,
    ) -> AppResult<Vec<FieldOverrideEntry>>;

    /// Inserts or replaces overrides as one atomic unit.
    ///
    /// Either every override is visible afterwards or none is.
    async fn upsert_overrides(
        &self,
        tenant_id: TenantId,
        table_id: &TableId,
        overrides: &[FieldOverride],
    ) -> AppResult<()>;

    /// Deletes every override of a table and returns the removed row count.
    async fn delete_table_overrides(&self, tenant_id: TenantId, table_id: &TableId)
    -> AppResult<u64>;

    /// Deletes the overrides of one field across all roles.
    async fn delete_field_overrides(
        &self,
        tenant_id: TenantId,
        table_id: &TableId,
        field_id: &FieldId,
    ) -> AppResult<u64>;
}

/// Read port onto the external table schema collaborator.
///
/// An unknown table behaves like a table without fields.
#[async_trait]
pub trait TableSchemaProvider: Send + Sync {
    /// Returns whether the field belongs to the table.
    async fn field_exists(
        &self,
        tenant_id: TenantId,
        table_id: &TableId,
        field_id: &FieldId,
    ) -> AppResult<bool>;

    /// Lists the table's fields in display order.
    async fn list_field_ids(&self, tenant_id: TenantId, table_id: &TableId)
    -> AppResult<Vec<FieldId>>;
}

/// Read port onto the external identity collaborator.
#[async_trait]
pub trait TableRoleProvider: Send + Sync {
    /// Returns the effective role of a subject for a table, if any.
    async fn role_for_subject(
        &self,
        tenant_id: TenantId,
        table_id: &TableId,
        subject: &str,
    ) -> AppResult<Option<Role>>;
}
