use serde::{Deserialize, Serialize};

/// Stable audit actions emitted by field permission use-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Emitted when a single override is written.
    FieldPermissionSet,
    /// Emitted when a batch of overrides is written.
    FieldPermissionsBatchSet,
    /// Emitted when a table's overrides are removed.
    FieldPermissionsReset,
    /// Emitted when explicit denials are written for a table.
    FieldPermissionsCleared,
    /// Emitted when a permission template is applied.
    FieldPermissionsTemplateApplied,
    /// Emitted when the overrides of a deleted field are removed.
    FieldPermissionsFieldRemoved,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FieldPermissionSet => "field_permission.set",
            Self::FieldPermissionsBatchSet => "field_permission.batch_set",
            Self::FieldPermissionsReset => "field_permission.reset",
            Self::FieldPermissionsCleared => "field_permission.cleared",
            Self::FieldPermissionsTemplateApplied => "field_permission.template_applied",
            Self::FieldPermissionsFieldRemoved => "field_permission.field_removed",
        }
    }
}
