use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Reason a single batch entry was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationIssueKind {
    /// Role value outside the closed role enumeration.
    InvalidRole,
    /// Role is protected and cannot carry overrides.
    ProtectedRole,
    /// Field is not part of the table schema.
    UnknownField,
    /// Field identifier is empty or malformed.
    InvalidField,
}

impl ValidationIssueKind {
    /// Returns a stable transport value for this issue kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidRole => "invalid_role",
            Self::ProtectedRole => "protected_role",
            Self::UnknownField => "unknown_field",
            Self::InvalidField => "invalid_field",
        }
    }
}

/// One offending entry of a rejected batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Zero-based position of the entry in the submitted batch.
    pub index: usize,
    /// Field identifier as submitted.
    pub field_id: String,
    /// Role value as submitted.
    pub role: String,
    /// Rejection reason.
    pub kind: ValidationIssueKind,
}

impl ValidationIssue {
    /// Creates an issue for the entry at `index`.
    #[must_use]
    pub fn new(
        index: usize,
        field_id: impl Into<String>,
        role: impl Into<String>,
        kind: ValidationIssueKind,
    ) -> Self {
        Self {
            index,
            field_id: field_id.into(),
            role: role.into(),
            kind,
        }
    }
}

impl Display for ValidationIssue {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "entry #{} (field '{}', role '{}'): {}",
            self.index,
            self.field_id,
            self.role,
            self.kind.as_str()
        )
    }
}
