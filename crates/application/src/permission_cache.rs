use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use fieldward_core::{AppResult, TenantId};
use fieldward_domain::{FieldId, PermissionFlags, Role, TableId};
use tracing::debug;

use crate::{FieldOverrideEntry, FieldOverrideStore};

type CacheKey = (TenantId, TableId);

/// Immutable snapshot of one table's overrides.
#[derive(Debug, Default)]
pub struct TableOverrides {
    entries: Vec<FieldOverrideEntry>,
    index: HashMap<(FieldId, Role), PermissionFlags>,
}

impl TableOverrides {
    /// Builds a snapshot from persisted entries.
    #[must_use]
    pub fn from_entries(entries: Vec<FieldOverrideEntry>) -> Self {
        let index = entries
            .iter()
            .map(|entry| {
                (
                    (
                        entry.field_override.field_id().clone(),
                        entry.field_override.role(),
                    ),
                    entry.field_override.flags(),
                )
            })
            .collect();

        Self { entries, index }
    }

    /// Returns the override flags for a field and role, if configured.
    #[must_use]
    pub fn flags_for(&self, field_id: &FieldId, role: Role) -> Option<PermissionFlags> {
        self.index.get(&(field_id.clone(), role)).copied()
    }

    /// Returns the raw entries in store order.
    #[must_use]
    pub fn entries(&self) -> &[FieldOverrideEntry] {
        self.entries.as_slice()
    }
}

#[derive(Default)]
struct CacheState {
    snapshots: HashMap<CacheKey, Arc<TableOverrides>>,
    generations: HashMap<CacheKey, u64>,
    epoch: u64,
}

impl CacheState {
    fn stamp(&self, key: &CacheKey) -> (u64, u64) {
        (self.epoch, self.generations.get(key).copied().unwrap_or_default())
    }
}

/// Read-through cache of override snapshots keyed by tenant and table.
///
/// Entries have no expiry; they live until invalidated. Each key carries a
/// generation counter bumped by its invalidation, and `invalidate_all` bumps
/// a shared epoch. A load is only installed when neither moved while it was
/// in flight.
#[derive(Clone)]
pub struct PermissionCache {
    store: FieldOverrideStore,
    state: Arc<RwLock<CacheState>>,
}

impl PermissionCache {
    /// Creates an empty cache in front of `store`.
    #[must_use]
    pub fn new(store: FieldOverrideStore) -> Self {
        Self {
            store,
            state: Arc::new(RwLock::new(CacheState::default())),
        }
    }

    /// Returns the table snapshot, loading it from the store on a miss.
    pub async fn get(
        &self,
        tenant_id: TenantId,
        table_id: &TableId,
    ) -> AppResult<Arc<TableOverrides>> {
        let key = (tenant_id, table_id.clone());
        let stamp = {
            let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(snapshot) = state.snapshots.get(&key) {
                return Ok(Arc::clone(snapshot));
            }
            state.stamp(&key)
        };

        debug!(tenant_id = %tenant_id, table_id = %table_id, "field override cache miss");
        let loaded = Arc::new(TableOverrides::from_entries(
            self.store.load(tenant_id, table_id).await?,
        ));

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.stamp(&key) != stamp {
            debug!(
                tenant_id = %tenant_id,
                table_id = %table_id,
                "field override load raced an invalidation, not caching"
            );
            return Ok(loaded);
        }

        Ok(Arc::clone(state.snapshots.entry(key).or_insert(loaded)))
    }

    /// Drops the cached snapshot of one table.
    pub fn invalidate(&self, tenant_id: TenantId, table_id: &TableId) {
        let key = (tenant_id, table_id.clone());
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.snapshots.remove(&key);
        let generation = state.generations.entry(key).or_default();
        *generation = generation.wrapping_add(1);
        debug!(tenant_id = %tenant_id, table_id = %table_id, "field override cache invalidated");
    }

    /// Drops every cached snapshot.
    pub fn invalidate_all(&self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.snapshots.clear();
        state.epoch = state.epoch.wrapping_add(1);
        debug!("field override cache cleared");
    }

    /// Returns whether a snapshot is cached for the table.
    #[must_use]
    pub fn contains(&self, tenant_id: TenantId, table_id: &TableId) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshots
            .contains_key(&(tenant_id, table_id.clone()))
    }

    /// Returns a guard that invalidates the table when dropped.
    ///
    /// Mutations hold it across their store write so the table is invalidated
    /// on success, failure, and cancellation alike.
    pub(crate) fn invalidate_on_drop(
        &self,
        tenant_id: TenantId,
        table_id: &TableId,
    ) -> InvalidationGuard<'_> {
        InvalidationGuard {
            cache: self,
            tenant_id,
            table_id: table_id.clone(),
        }
    }
}

pub(crate) struct InvalidationGuard<'a> {
    cache: &'a PermissionCache,
    tenant_id: TenantId,
    table_id: TableId,
}

impl Drop for InvalidationGuard<'_> {
    fn drop(&mut self) {
        self.cache.invalidate(self.tenant_id, &self.table_id);
    }
}

#[cfg(test)]
mod tests;
