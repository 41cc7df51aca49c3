use fieldward_application::FieldPermissionService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub field_permission_service: FieldPermissionService,
    pub frontend_url: String,
}
