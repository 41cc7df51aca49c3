use serde::Serialize;
use ts_rs::TS;

mod field_permissions;

pub use field_permissions::{
    ApplyPermissionTemplateRequest, BatchSetFieldPermissionsRequest, CheckPermissionRequest,
    CheckPermissionResponse, ClearFieldPermissionsRequest, FieldAccessEntryResponse,
    FieldAccessResponse, FieldPermissionResponse, RemovedFieldPermissionsResponse,
    SetActionForAllFieldsRequest, SetFieldPermissionRequest,
};

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
}
