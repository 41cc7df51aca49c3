//! Infrastructure adapters for field permission ports.

#![forbid(unsafe_code)]

mod in_memory_audit_repository;
mod in_memory_field_override_repository;
mod in_memory_table_directory;
mod postgres_audit_repository;
mod postgres_field_override_repository;
mod postgres_table_directory;

#[cfg(test)]
mod postgres_test_support;

pub use in_memory_audit_repository::InMemoryAuditRepository;
pub use in_memory_field_override_repository::InMemoryFieldOverrideRepository;
pub use in_memory_table_directory::InMemoryTableDirectory;
pub use postgres_audit_repository::PostgresAuditRepository;
pub use postgres_field_override_repository::PostgresFieldOverrideRepository;
pub use postgres_table_directory::PostgresTableDirectory;
