use fieldward_application::{TableRoleProvider, TableSchemaProvider};
use fieldward_core::TenantId;
use fieldward_domain::{FieldId, Role, TableId};

use super::InMemoryTableDirectory;

fn field_ids(values: &[&str]) -> Vec<FieldId> {
    values
        .iter()
        .map(|value| match FieldId::new(*value) {
            Ok(field_id) => field_id,
            Err(error) => panic!("invalid field id: {error}"),
        })
        .collect()
}

fn people() -> TableId {
    match TableId::new("tbl_people") {
        Ok(table_id) => table_id,
        Err(error) => panic!("invalid table id: {error}"),
    }
}

#[tokio::test]
async fn unknown_table_behaves_like_table_without_fields() {
    let directory = InMemoryTableDirectory::new();
    let tenant_id = TenantId::new();

    let fields = directory.list_field_ids(tenant_id, &people()).await;
    let exists = directory
        .field_exists(tenant_id, &people(), &field_ids(&["name"])[0])
        .await;

    assert!(matches!(fields, Ok(fields) if fields.is_empty()));
    assert!(matches!(exists, Ok(false)));
}

#[tokio::test]
async fn dropped_field_disappears_from_schema() {
    let directory = InMemoryTableDirectory::new();
    let tenant_id = TenantId::new();
    directory
        .define_table(tenant_id, people(), field_ids(&["name", "email", "salary"]))
        .await;

    let email = &field_ids(&["email"])[0];
    assert!(directory.drop_field(tenant_id, &people(), email).await);
    assert!(!directory.drop_field(tenant_id, &people(), email).await);

    let fields = directory.list_field_ids(tenant_id, &people()).await;
    assert!(matches!(fields, Ok(fields) if fields == field_ids(&["name", "salary"])));
}

#[tokio::test]
async fn member_roles_are_scoped_per_tenant() {
    let directory = InMemoryTableDirectory::new();
    let tenant_id = TenantId::new();
    directory
        .assign_member(tenant_id, people(), "alice", Role::Owner)
        .await;

    let own = directory.role_for_subject(tenant_id, &people(), "alice").await;
    let foreign = directory
        .role_for_subject(TenantId::new(), &people(), "alice")
        .await;

    assert!(matches!(own, Ok(Some(Role::Owner))));
    assert!(matches!(foreign, Ok(None)));
}
