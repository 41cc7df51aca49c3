use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use tokio::sync::RwLock;

use fieldward_application::{FieldOverrideEntry, FieldOverrideRepository};
use fieldward_core::{AppResult, TenantId};
use fieldward_domain::{FieldId, FieldOverride, Role, TableId};

type TableRows = BTreeMap<(FieldId, Role), FieldOverrideEntry>;

/// In-memory field override repository.
///
/// A batch is applied under one write lock, so readers observe all of it or
/// none of it.
#[derive(Debug, Default)]
pub struct InMemoryFieldOverrideRepository {
    tables: RwLock<HashMap<(TenantId, TableId), TableRows>>,
}

impl InMemoryFieldOverrideRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FieldOverrideRepository for InMemoryFieldOverrideRepository {
    async fn list_overrides(
        &self,
        tenant_id: TenantId,
        table_id: &TableId,
    ) -> AppResult<Vec<FieldOverrideEntry>> {
        Ok(self
            .tables
            .read()
            .await
            .get(&(tenant_id, table_id.clone()))
            .map(|rows| rows.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn upsert_overrides(
        &self,
        tenant_id: TenantId,
        table_id: &TableId,
        overrides: &[FieldOverride],
    ) -> AppResult<()> {
        let updated_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let mut tables = self.tables.write().await;
        let rows = tables.entry((tenant_id, table_id.clone())).or_default();

        for field_override in overrides {
            rows.insert(
                (field_override.field_id().clone(), field_override.role()),
                FieldOverrideEntry {
                    field_override: field_override.clone(),
                    updated_at: updated_at.clone(),
                },
            );
        }

        Ok(())
    }

    async fn delete_table_overrides(
        &self,
        tenant_id: TenantId,
        table_id: &TableId,
    ) -> AppResult<u64> {
        Ok(self
            .tables
            .write()
            .await
            .remove(&(tenant_id, table_id.clone()))
            .map_or(0, |rows| rows.len() as u64))
    }

    async fn delete_field_overrides(
        &self,
        tenant_id: TenantId,
        table_id: &TableId,
        field_id: &FieldId,
    ) -> AppResult<u64> {
        let mut tables = self.tables.write().await;
        let Some(rows) = tables.get_mut(&(tenant_id, table_id.clone())) else {
            return Ok(0);
        };

        let before = rows.len();
        rows.retain(|(stored_field_id, _), _| stored_field_id != field_id);
        Ok((before - rows.len()) as u64)
    }
}
