use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use fieldward_application::{AuditEvent, AuditRepository};
use fieldward_core::{AppResult, TenantId};

/// In-memory append-only audit repository.
#[derive(Debug, Default)]
pub struct InMemoryAuditRepository {
    events: RwLock<Vec<AuditEvent>>,
}

impl InMemoryAuditRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the events recorded for a tenant, oldest first.
    pub async fn events_for_tenant(&self, tenant_id: TenantId) -> Vec<AuditEvent> {
        self.events
            .read()
            .await
            .iter()
            .filter(|event| event.tenant_id == tenant_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl AuditRepository for InMemoryAuditRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        debug!(
            tenant_id = %event.tenant_id,
            action = event.action.as_str(),
            "recording audit event"
        );
        self.events.write().await.push(event);
        Ok(())
    }
}
