use std::str::FromStr;

use async_trait::async_trait;
use sqlx::PgPool;

use fieldward_application::{TableRoleProvider, TableSchemaProvider};
use fieldward_core::{AppError, AppResult, TenantId};
use fieldward_domain::{FieldId, Role, TableId};

use crate::postgres_field_override_repository::store_unavailable;

/// PostgreSQL reader for the collaborator-owned `table_fields` and
/// `table_members` tables.
#[derive(Clone)]
pub struct PostgresTableDirectory {
    pool: PgPool,
}

impl PostgresTableDirectory {
    /// Creates a directory with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TableSchemaProvider for PostgresTableDirectory {
    async fn field_exists(
        &self,
        tenant_id: TenantId,
        table_id: &TableId,
        field_id: &FieldId,
    ) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM table_fields
                WHERE tenant_id = $1 AND table_id = $2 AND field_id = $3
            )
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(table_id.as_str())
        .bind(field_id.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            store_unavailable(
                format!("failed to look up field '{field_id}' in table '{table_id}'"),
                error,
            )
        })
    }

    async fn list_field_ids(
        &self,
        tenant_id: TenantId,
        table_id: &TableId,
    ) -> AppResult<Vec<FieldId>> {
        let fields = sqlx::query_scalar::<_, String>(
            r#"
            SELECT field_id
            FROM table_fields
            WHERE tenant_id = $1 AND table_id = $2
            ORDER BY position, field_id
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(table_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            store_unavailable(
                format!("failed to list fields of table '{table_id}' in tenant '{tenant_id}'"),
                error,
            )
        })?;

        fields.into_iter().map(FieldId::new).collect()
    }
}

#[async_trait]
impl TableRoleProvider for PostgresTableDirectory {
    async fn role_for_subject(
        &self,
        tenant_id: TenantId,
        table_id: &TableId,
        subject: &str,
    ) -> AppResult<Option<Role>> {
        let role = sqlx::query_scalar::<_, String>(
            r#"
            SELECT role
            FROM table_members
            WHERE tenant_id = $1 AND table_id = $2 AND subject = $3
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(table_id.as_str())
        .bind(subject)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            store_unavailable(
                format!("failed to load role of '{subject}' for table '{table_id}'"),
                error,
            )
        })?;

        role.map(|value| {
            Role::from_str(value.as_str()).map_err(|error| {
                AppError::Internal(format!(
                    "stored role of '{subject}' for table '{table_id}' is corrupt: {error}"
                ))
            })
        })
        .transpose()
    }
}
