use std::str::FromStr;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tracing::warn;

use fieldward_application::{FieldOverrideEntry, FieldOverrideRepository};
use fieldward_core::{AppError, AppResult, TenantId};
use fieldward_domain::{FieldId, FieldOverride, PermissionFlags, Role, TableId};

/// PostgreSQL-backed field override repository.
#[derive(Clone)]
pub struct PostgresFieldOverrideRepository {
    pool: PgPool,
}

impl PostgresFieldOverrideRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct FieldOverrideRow {
    field_id: String,
    role: String,
    can_read: bool,
    can_write: bool,
    can_delete: bool,
    updated_at: String,
}

impl FieldOverrideRow {
    fn into_entry(self, table_id: &TableId) -> AppResult<FieldOverrideEntry> {
        let field_id = FieldId::new(self.field_id)?;
        let role = Role::from_str(self.role.as_str()).map_err(|error| {
            AppError::Internal(format!(
                "stored override for field '{field_id}' in table '{table_id}' is corrupt: {error}"
            ))
        })?;

        Ok(FieldOverrideEntry {
            field_override: FieldOverride::new(
                table_id.clone(),
                field_id,
                role,
                PermissionFlags::new(self.can_read, self.can_write, self.can_delete),
            )?,
            updated_at: self.updated_at,
        })
    }
}

pub(crate) fn store_unavailable(context: String, error: sqlx::Error) -> AppError {
    warn!(error = %error, "{context}");
    AppError::StoreUnavailable(format!("{context}: {error}"))
}

#[async_trait]
impl FieldOverrideRepository for PostgresFieldOverrideRepository {
    async fn list_overrides(
        &self,
        tenant_id: TenantId,
        table_id: &TableId,
    ) -> AppResult<Vec<FieldOverrideEntry>> {
        let rows = sqlx::query_as::<_, FieldOverrideRow>(
            r#"
            SELECT
                field_id,
                role,
                can_read,
                can_write,
                can_delete,
                to_char(updated_at AT TIME ZONE 'UTC', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS updated_at
            FROM field_permission_overrides
            WHERE tenant_id = $1 AND table_id = $2
            ORDER BY field_id, role
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(table_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            store_unavailable(
                format!("failed to load field overrides for table '{table_id}' in tenant '{tenant_id}'"),
                error,
            )
        })?;

        rows.into_iter()
            .map(|row| row.into_entry(table_id))
            .collect()
    }

    async fn upsert_overrides(
        &self,
        tenant_id: TenantId,
        table_id: &TableId,
        overrides: &[FieldOverride],
    ) -> AppResult<()> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            store_unavailable(
                format!("failed to start field override transaction for tenant '{tenant_id}'"),
                error,
            )
        })?;

        for field_override in overrides {
            let flags = field_override.flags();
            sqlx::query(
                r#"
                INSERT INTO field_permission_overrides (
                    tenant_id,
                    table_id,
                    field_id,
                    role,
                    can_read,
                    can_write,
                    can_delete
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (tenant_id, table_id, field_id, role) DO UPDATE
                SET can_read = EXCLUDED.can_read,
                    can_write = EXCLUDED.can_write,
                    can_delete = EXCLUDED.can_delete,
                    updated_at = now()
                "#,
            )
            .bind(tenant_id.as_uuid())
            .bind(table_id.as_str())
            .bind(field_override.field_id().as_str())
            .bind(field_override.role().as_str())
            .bind(flags.can_read)
            .bind(flags.can_write)
            .bind(flags.can_delete)
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                store_unavailable(
                    format!(
                        "failed to write override for field '{}' role '{}' in table '{table_id}'",
                        field_override.field_id(),
                        field_override.role()
                    ),
                    error,
                )
            })?;
        }

        transaction.commit().await.map_err(|error| {
            store_unavailable(
                format!(
                    "failed to commit field override transaction for table '{table_id}' in tenant '{tenant_id}'"
                ),
                error,
            )
        })
    }

    async fn delete_table_overrides(
        &self,
        tenant_id: TenantId,
        table_id: &TableId,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM field_permission_overrides
            WHERE tenant_id = $1 AND table_id = $2
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(table_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            store_unavailable(
                format!("failed to reset field overrides for table '{table_id}' in tenant '{tenant_id}'"),
                error,
            )
        })?;

        Ok(result.rows_affected())
    }

    async fn delete_field_overrides(
        &self,
        tenant_id: TenantId,
        table_id: &TableId,
        field_id: &FieldId,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM field_permission_overrides
            WHERE tenant_id = $1 AND table_id = $2 AND field_id = $3
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(table_id.as_str())
        .bind(field_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            store_unavailable(
                format!("failed to remove overrides of field '{field_id}' in table '{table_id}'"),
                error,
            )
        })?;

        Ok(result.rows_affected())
    }
}
