use fieldward_core::ValidationIssue;
use serde::Serialize;
use ts_rs::TS;

/// One rejected batch entry.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/validation-issue-response.ts"
)]
pub struct ValidationIssueResponse {
    index: usize,
    field_id: String,
    role: String,
    kind: &'static str,
}

impl From<&ValidationIssue> for ValidationIssueResponse {
    fn from(value: &ValidationIssue) -> Self {
        Self {
            index: value.index,
            field_id: value.field_id.clone(),
            role: value.role.clone(),
            kind: value.kind.as_str(),
        }
    }
}

/// API error payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/error-response.ts"
)]
pub struct ErrorResponse {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    issues: Option<Vec<ValidationIssueResponse>>,
}

impl ErrorResponse {
    pub(super) fn new(
        code: &'static str,
        message: String,
        issues: Option<Vec<ValidationIssueResponse>>,
    ) -> Self {
        Self {
            code,
            message,
            issues,
        }
    }
}
