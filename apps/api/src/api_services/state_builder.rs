use std::sync::Arc;

use fieldward_application::{FieldPermissionConfig, FieldPermissionService};
use fieldward_infrastructure::{
    PostgresAuditRepository, PostgresFieldOverrideRepository, PostgresTableDirectory,
};
use sqlx::PgPool;

use crate::api_config::ApiConfig;
use crate::state::AppState;

pub fn build_app_state(pool: PgPool, config: &ApiConfig) -> AppState {
    let table_directory = Arc::new(PostgresTableDirectory::new(pool.clone()));

    let field_permission_service = FieldPermissionService::new(
        Arc::new(PostgresFieldOverrideRepository::new(pool.clone())),
        table_directory.clone(),
        table_directory,
        Arc::new(PostgresAuditRepository::new(pool)),
        FieldPermissionConfig {
            store_timeout: config.store_timeout,
        },
    );

    AppState {
        field_permission_service,
        frontend_url: config.frontend_url.clone(),
    }
}
