mod audit;
mod entries;
mod repositories;

pub use audit::{AuditEvent, AuditRepository};
pub use entries::FieldOverrideEntry;
pub use repositories::{FieldOverrideRepository, TableRoleProvider, TableSchemaProvider};
