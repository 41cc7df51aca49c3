use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use fieldward_application::{TableRoleProvider, TableSchemaProvider};
use fieldward_core::{AppResult, TenantId};
use fieldward_domain::{FieldId, Role, TableId};

/// In-memory stand-in for the table schema and membership collaborators.
#[derive(Debug, Default)]
pub struct InMemoryTableDirectory {
    fields: RwLock<HashMap<(TenantId, TableId), Vec<FieldId>>>,
    members: RwLock<HashMap<(TenantId, TableId, String), Role>>,
}

impl InMemoryTableDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the ordered field list of a table.
    pub async fn define_table(
        &self,
        tenant_id: TenantId,
        table_id: TableId,
        fields: Vec<FieldId>,
    ) {
        self.fields
            .write()
            .await
            .insert((tenant_id, table_id), fields);
    }

    /// Drops one field from a table. Returns whether it existed.
    pub async fn drop_field(
        &self,
        tenant_id: TenantId,
        table_id: &TableId,
        field_id: &FieldId,
    ) -> bool {
        let mut fields = self.fields.write().await;
        let Some(table_fields) = fields.get_mut(&(tenant_id, table_id.clone())) else {
            return false;
        };

        let before = table_fields.len();
        table_fields.retain(|stored| stored != field_id);
        table_fields.len() != before
    }

    /// Grants `subject` a role on a table, replacing any previous one.
    pub async fn assign_member(
        &self,
        tenant_id: TenantId,
        table_id: TableId,
        subject: impl Into<String>,
        role: Role,
    ) {
        self.members
            .write()
            .await
            .insert((tenant_id, table_id, subject.into()), role);
    }
}

#[async_trait]
impl TableSchemaProvider for InMemoryTableDirectory {
    async fn field_exists(
        &self,
        tenant_id: TenantId,
        table_id: &TableId,
        field_id: &FieldId,
    ) -> AppResult<bool> {
        Ok(self
            .fields
            .read()
            .await
            .get(&(tenant_id, table_id.clone()))
            .is_some_and(|fields| fields.contains(field_id)))
    }

    async fn list_field_ids(
        &self,
        tenant_id: TenantId,
        table_id: &TableId,
    ) -> AppResult<Vec<FieldId>> {
        Ok(self
            .fields
            .read()
            .await
            .get(&(tenant_id, table_id.clone()))
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl TableRoleProvider for InMemoryTableDirectory {
    async fn role_for_subject(
        &self,
        tenant_id: TenantId,
        table_id: &TableId,
        subject: &str,
    ) -> AppResult<Option<Role>> {
        Ok(self
            .members
            .read()
            .await
            .get(&(tenant_id, table_id.clone(), subject.to_owned()))
            .copied())
    }
}

#[cfg(test)]
mod tests;
