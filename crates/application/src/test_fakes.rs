use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use fieldward_core::{AppError, AppResult, TenantId};
use fieldward_domain::{FieldId, FieldOverride, Role, TableId};
use tokio::sync::Mutex;

use crate::{
    AuditEvent, AuditRepository, FieldOverrideEntry, FieldOverrideRepository, FieldOverrideStore,
    PermissionCache, TableRoleProvider, TableSchemaProvider,
};

pub(crate) const TABLE: &str = "tbl_people";

type OverrideRows = BTreeMap<(String, String), FieldOverrideEntry>;

#[derive(Default)]
pub(crate) struct FakeOverrideRepository {
    rows: Mutex<HashMap<(TenantId, TableId), OverrideRows>>,
    pub(crate) list_calls: AtomicUsize,
    pub(crate) write_calls: AtomicUsize,
    pub(crate) fail_writes: AtomicBool,
    load_delay: Mutex<Option<Duration>>,
}

impl FakeOverrideRepository {
    pub(crate) async fn set_load_delay(&self, delay: Option<Duration>) {
        *self.load_delay.lock().await = delay;
    }

    pub(crate) async fn row_count(&self, tenant_id: TenantId, table_id: &TableId) -> usize {
        self.rows
            .lock()
            .await
            .get(&(tenant_id, table_id.clone()))
            .map_or(0, BTreeMap::len)
    }
}

#[async_trait]
impl FieldOverrideRepository for FakeOverrideRepository {
    async fn list_overrides(
        &self,
        tenant_id: TenantId,
        table_id: &TableId,
    ) -> AppResult<Vec<FieldOverrideEntry>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let snapshot = self
            .rows
            .lock()
            .await
            .get(&(tenant_id, table_id.clone()))
            .map(|rows| rows.values().cloned().collect())
            .unwrap_or_default();

        let delay = *self.load_delay.lock().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        Ok(snapshot)
    }

    async fn upsert_overrides(
        &self,
        tenant_id: TenantId,
        table_id: &TableId,
        overrides: &[FieldOverride],
    ) -> AppResult<()> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::StoreUnavailable(
                "transaction aborted by test".to_owned(),
            ));
        }

        let mut rows = self.rows.lock().await;
        let table_rows = rows.entry((tenant_id, table_id.clone())).or_default();
        for field_override in overrides {
            table_rows.insert(
                (
                    field_override.field_id().as_str().to_owned(),
                    field_override.role().as_str().to_owned(),
                ),
                FieldOverrideEntry {
                    field_override: field_override.clone(),
                    updated_at: "2026-01-01T00:00:00Z".to_owned(),
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
        let removed = self
            .rows
            .lock()
            .await
            .remove(&(tenant_id, table_id.clone()))
            .map_or(0, |rows| rows.len());
        Ok(removed as u64)
    }

    async fn delete_field_overrides(
        &self,
        tenant_id: TenantId,
        table_id: &TableId,
        field_id: &FieldId,
    ) -> AppResult<u64> {
        let mut rows = self.rows.lock().await;
        let Some(table_rows) = rows.get_mut(&(tenant_id, table_id.clone())) else {
            return Ok(0);
        };

        let before = table_rows.len();
        table_rows.retain(|(stored_field, _), _| stored_field != field_id.as_str());
        Ok((before - table_rows.len()) as u64)
    }
}

pub(crate) struct FakeSchemaProvider {
    fields: HashMap<(TenantId, String), Vec<FieldId>>,
}

impl FakeSchemaProvider {
    pub(crate) fn with_fields(tenant_id: TenantId, table: &str, fields: &[&str]) -> Self {
        Self {
            fields: HashMap::from([(
                (tenant_id, table.to_owned()),
                fields.iter().map(|field| field_id(field)).collect(),
            )]),
        }
    }
}

#[async_trait]
impl TableSchemaProvider for FakeSchemaProvider {
    async fn field_exists(
        &self,
        tenant_id: TenantId,
        table_id: &TableId,
        field_id: &FieldId,
    ) -> AppResult<bool> {
        Ok(self
            .fields
            .get(&(tenant_id, table_id.as_str().to_owned()))
            .is_some_and(|fields| fields.contains(field_id)))
    }

    async fn list_field_ids(
        &self,
        tenant_id: TenantId,
        table_id: &TableId,
    ) -> AppResult<Vec<FieldId>> {
        Ok(self
            .fields
            .get(&(tenant_id, table_id.as_str().to_owned()))
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Default)]
pub(crate) struct FakeRoleProvider {
    roles: HashMap<(TenantId, String, String), Role>,
}

impl FakeRoleProvider {
    pub(crate) fn with_member(
        mut self,
        tenant_id: TenantId,
        table: &str,
        subject: &str,
        role: Role,
    ) -> Self {
        self.roles
            .insert((tenant_id, table.to_owned(), subject.to_owned()), role);
        self
    }
}

#[async_trait]
impl TableRoleProvider for FakeRoleProvider {
    async fn role_for_subject(
        &self,
        tenant_id: TenantId,
        table_id: &TableId,
        subject: &str,
    ) -> AppResult<Option<Role>> {
        Ok(self
            .roles
            .get(&(tenant_id, table_id.as_str().to_owned(), subject.to_owned()))
            .copied())
    }
}

#[derive(Default)]
pub(crate) struct FakeAuditRepository {
    pub(crate) events: Mutex<Vec<AuditEvent>>,
}

#[async_trait]
impl AuditRepository for FakeAuditRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        self.events.lock().await.push(event);
        Ok(())
    }
}

pub(crate) fn table_id(value: &str) -> TableId {
    match TableId::new(value) {
        Ok(table_id) => table_id,
        Err(error) => panic!("invalid fixture table id: {error}"),
    }
}

pub(crate) fn field_id(value: &str) -> FieldId {
    match FieldId::new(value) {
        Ok(field_id) => field_id,
        Err(error) => panic!("invalid fixture field id: {error}"),
    }
}

/// Store and cache over a fake repository with fields `F1`, `F2`, `F3` in `TABLE`.
pub(crate) fn fixture(
    tenant_id: TenantId,
) -> (Arc<FakeOverrideRepository>, FieldOverrideStore, PermissionCache) {
    let repository = Arc::new(FakeOverrideRepository::default());
    let schema_provider = Arc::new(FakeSchemaProvider::with_fields(
        tenant_id,
        TABLE,
        &["F1", "F2", "F3"],
    ));
    let store = FieldOverrideStore::new(
        repository.clone(),
        schema_provider,
        Duration::from_secs(5),
    );
    let cache = PermissionCache::new(store.clone());

    (repository, store, cache)
}
