use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Path, State};

use fieldward_core::{AppResult, UserIdentity};
use fieldward_domain::{
    FieldAction, FieldId, FieldOverride, FieldPermissionChange, PermissionTemplate, Role, TableId,
};

use crate::dto::{
    ApplyPermissionTemplateRequest, BatchSetFieldPermissionsRequest, CheckPermissionRequest,
    CheckPermissionResponse, ClearFieldPermissionsRequest, FieldAccessResponse,
    FieldPermissionResponse, RemovedFieldPermissionsResponse, SetActionForAllFieldsRequest,
    SetFieldPermissionRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

mod access;
mod configuration;

pub use access::{check_permission_handler, field_access_handler};
pub use configuration::{
    apply_permission_template_handler, batch_set_field_permissions_handler,
    clear_field_permissions_handler, list_field_permissions_handler,
    remove_field_permissions_handler, reset_field_permissions_handler,
    set_action_for_all_fields_handler, set_field_permission_handler,
};

fn overrides_response(overrides: Vec<FieldOverride>) -> Json<Vec<FieldPermissionResponse>> {
    Json(
        overrides
            .into_iter()
            .map(FieldPermissionResponse::from)
            .collect(),
    )
}
