pub mod field_permissions;
pub mod health;
