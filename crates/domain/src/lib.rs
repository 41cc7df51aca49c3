//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod audit;
mod field_override;
mod permission;
mod role;
mod table;
mod template;

pub use audit::AuditAction;
pub use field_override::{FieldOverride, FieldPermissionChange};
pub use permission::{DefaultPolicy, FieldAction, PermissionFlags};
pub use role::Role;
pub use table::{FieldId, TableId};
pub use template::PermissionTemplate;
