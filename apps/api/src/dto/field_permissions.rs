use fieldward_application::{FieldAccess, FieldOverrideEntry, FieldResolution};
use fieldward_domain::{FieldOverride, FieldPermissionChange, PermissionFlags};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Incoming payload for a single override.
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/set-field-permission-request.ts"
)]
pub struct SetFieldPermissionRequest {
    pub field_id: String,
    pub role: String,
    pub can_read: bool,
    pub can_write: bool,
    pub can_delete: bool,
}

impl From<SetFieldPermissionRequest> for FieldPermissionChange {
    fn from(value: SetFieldPermissionRequest) -> Self {
        FieldPermissionChange::new(
            value.field_id,
            value.role,
            PermissionFlags::new(value.can_read, value.can_write, value.can_delete),
        )
    }
}

/// Incoming payload for an atomic batch of overrides.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/batch-set-field-permissions-request.ts"
)]
pub struct BatchSetFieldPermissionsRequest {
    pub permissions: Vec<SetFieldPermissionRequest>,
}

/// Incoming payload for writing explicit denials.
///
/// Omitted or empty `roles` selects every non-protected role.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/clear-field-permissions-request.ts"
)]
pub struct ClearFieldPermissionsRequest {
    #[serde(default)]
    #[ts(optional)]
    pub roles: Option<Vec<String>>,
}

/// Incoming payload for applying a permission template.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/apply-permission-template-request.ts"
)]
pub struct ApplyPermissionTemplateRequest {
    pub template: String,
}

/// Incoming payload for toggling one action on every field.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/set-action-for-all-fields-request.ts"
)]
pub struct SetActionForAllFieldsRequest {
    pub role: String,
    pub action: String,
    pub allowed: bool,
}

/// Incoming payload for a point permission check.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/check-permission-request.ts"
)]
pub struct CheckPermissionRequest {
    pub field_id: String,
    pub role: String,
    pub action: String,
}

/// Point permission decision.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/check-permission-response.ts"
)]
pub struct CheckPermissionResponse {
    pub allowed: bool,
}

/// API representation of a stored override.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/field-permission-response.ts"
)]
pub struct FieldPermissionResponse {
    pub table_id: String,
    pub field_id: String,
    pub role: String,
    pub can_read: bool,
    pub can_write: bool,
    pub can_delete: bool,
    #[ts(optional)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl From<FieldOverride> for FieldPermissionResponse {
    fn from(value: FieldOverride) -> Self {
        let flags = value.flags();
        Self {
            table_id: value.table_id().as_str().to_owned(),
            field_id: value.field_id().as_str().to_owned(),
            role: value.role().as_str().to_owned(),
            can_read: flags.can_read,
            can_write: flags.can_write,
            can_delete: flags.can_delete,
            updated_at: None,
        }
    }
}

impl From<FieldOverrideEntry> for FieldPermissionResponse {
    fn from(value: FieldOverrideEntry) -> Self {
        Self {
            updated_at: Some(value.updated_at),
            ..Self::from(value.field_override)
        }
    }
}

/// Count of overrides removed by a reset or field cascade.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/removed-field-permissions-response.ts"
)]
pub struct RemovedFieldPermissionsResponse {
    #[ts(type = "number")]
    pub removed: u64,
}

/// Resolved permission of one field for the caller.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/field-access-entry-response.ts"
)]
pub struct FieldAccessEntryResponse {
    pub field_id: String,
    pub can_read: bool,
    pub can_write: bool,
    pub can_delete: bool,
    pub source: &'static str,
}

impl From<FieldResolution> for FieldAccessEntryResponse {
    fn from(value: FieldResolution) -> Self {
        let flags = value.permission.flags;
        Self {
            field_id: value.field_id.as_str().to_owned(),
            can_read: flags.can_read,
            can_write: flags.can_write,
            can_delete: flags.can_delete,
            source: value.permission.source.as_str(),
        }
    }
}

/// Caller's role and resolved permissions for every field of a table.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/field-access-response.ts"
)]
pub struct FieldAccessResponse {
    pub role: String,
    pub fields: Vec<FieldAccessEntryResponse>,
}

impl From<FieldAccess> for FieldAccessResponse {
    fn from(value: FieldAccess) -> Self {
        Self {
            role: value.role.as_str().to_owned(),
            fields: value
                .fields
                .into_iter()
                .map(FieldAccessEntryResponse::from)
                .collect(),
        }
    }
}
