use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use fieldward_application::{AuditEvent, AuditRepository};
use fieldward_core::AppResult;

use crate::postgres_field_override_repository::store_unavailable;

/// PostgreSQL-backed append-only audit repository.
#[derive(Clone)]
pub struct PostgresAuditRepository {
    pool: PgPool,
}

impl PostgresAuditRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditRepository for PostgresAuditRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        let action = event.action.as_str();
        let tenant_id = event.tenant_id;
        debug!(
            tenant_id = %tenant_id,
            action,
            resource_id = %event.resource_id,
            "appending audit event"
        );

        sqlx::query(
            r#"
            INSERT INTO audit_log_entries (
                tenant_id,
                subject,
                action,
                resource_type,
                resource_id,
                detail
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(event.tenant_id.as_uuid())
        .bind(event.subject)
        .bind(action)
        .bind(event.resource_type)
        .bind(event.resource_id)
        .bind(event.detail)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            store_unavailable(
                format!("failed to append audit event '{action}' for tenant '{tenant_id}'"),
                error,
            )
        })?;

        Ok(())
    }
}
