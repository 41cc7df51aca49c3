use axum::Router;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{delete, get, post, put};
use fieldward_core::AppError;
use tower_http::trace::TraceLayer;
use tower_sessions::SessionManagerLayer;
use tower_sessions_sqlx_store::PostgresStore;

use crate::state::AppState;
use crate::{auth, handlers, middleware};

mod cors;

pub fn build_router(
    app_state: AppState,
    frontend_url: &str,
    session_layer: SessionManagerLayer<PostgresStore>,
) -> Result<Router, AppError> {
    let protected_routes = Router::new()
        .route(
            "/api/tables/{table_id}/field-permissions",
            get(handlers::field_permissions::list_field_permissions_handler)
                .put(handlers::field_permissions::set_field_permission_handler)
                .delete(handlers::field_permissions::reset_field_permissions_handler),
        )
        .route(
            "/api/tables/{table_id}/field-permissions/batch",
            put(handlers::field_permissions::batch_set_field_permissions_handler),
        )
        .route(
            "/api/tables/{table_id}/field-permissions/clear",
            post(handlers::field_permissions::clear_field_permissions_handler),
        )
        .route(
            "/api/tables/{table_id}/field-permissions/template",
            post(handlers::field_permissions::apply_permission_template_handler),
        )
        .route(
            "/api/tables/{table_id}/field-permissions/select-all",
            post(handlers::field_permissions::set_action_for_all_fields_handler),
        )
        .route(
            "/api/tables/{table_id}/field-permissions/check",
            post(handlers::field_permissions::check_permission_handler),
        )
        .route(
            "/api/tables/{table_id}/field-access",
            get(handlers::field_permissions::field_access_handler),
        )
        .route(
            "/api/tables/{table_id}/fields/{field_id}/field-permissions",
            delete(handlers::field_permissions::remove_field_permissions_handler),
        )
        .route_layer(from_fn(middleware::require_auth));

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .merge(protected_routes)
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_same_origin_for_mutations,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors::build_cors_layer(frontend_url)?)
        .layer(session_layer)
        .with_state(app_state))
}
