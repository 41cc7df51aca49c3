//! Application services and ports for field-level permissions.

#![forbid(unsafe_code)]

mod batch_mutator;
mod field_override_store;
mod field_permission_ports;
mod field_permission_service;
mod permission_cache;
mod permission_resolver;
mod store_timeout;

#[cfg(test)]
mod test_fakes;

pub use batch_mutator::BatchMutator;
pub use field_override_store::FieldOverrideStore;
pub use field_permission_ports::{
    AuditEvent, AuditRepository, FieldOverrideEntry, FieldOverrideRepository, TableRoleProvider,
    TableSchemaProvider,
};
pub use field_permission_service::{FieldAccess, FieldPermissionConfig, FieldPermissionService};
pub use permission_cache::{PermissionCache, TableOverrides};
pub use permission_resolver::{
    FieldResolution, PermissionResolver, ResolutionSource, ResolvedPermission,
};
pub use store_timeout::DEFAULT_STORE_TIMEOUT;
