use fieldward_domain::FieldOverride;

/// Persisted override together with its last write timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldOverrideEntry {
    /// Stored override.
    pub field_override: FieldOverride,
    /// Last update timestamp in RFC3339.
    pub updated_at: String,
}
