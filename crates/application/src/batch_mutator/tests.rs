use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use fieldward_core::{AppError, TenantId};
use fieldward_domain::{
    FieldAction, FieldPermissionChange, PermissionFlags, PermissionTemplate, Role,
};

use crate::test_fakes::{FakeOverrideRepository, TABLE, field_id, fixture, table_id};
use crate::{BatchMutator, PermissionCache, PermissionResolver};

struct Harness {
    repository: Arc<FakeOverrideRepository>,
    mutator: BatchMutator,
    resolver: PermissionResolver,
    cache: PermissionCache,
}

fn harness(tenant_id: TenantId) -> Harness {
    let (repository, store, cache) = fixture(tenant_id);
    Harness {
        repository,
        mutator: BatchMutator::new(store.clone(), cache.clone()),
        resolver: PermissionResolver::new(cache.clone(), store),
        cache,
    }
}

async fn allows(
    harness: &Harness,
    tenant_id: TenantId,
    field: &str,
    role: Role,
    action: FieldAction,
) -> bool {
    match harness
        .resolver
        .resolve(tenant_id, &table_id(TABLE), &field_id(field), role, action)
        .await
    {
        Ok(allowed) => allowed,
        Err(error) => panic!("resolution failed: {error}"),
    }
}

#[tokio::test]
async fn apply_one_is_visible_to_the_next_resolution() {
    let tenant_id = TenantId::new();
    let harness = harness(tenant_id);
    let table = table_id(TABLE);

    assert!(allows(&harness, tenant_id, "F1", Role::Viewer, FieldAction::Read).await);
    assert!(harness.cache.contains(tenant_id, &table));

    let written = harness
        .mutator
        .apply_one(tenant_id, &table, "F1", "viewer", PermissionFlags::none())
        .await;
    assert!(written.is_ok());
    assert!(!harness.cache.contains(tenant_id, &table));

    assert!(!allows(&harness, tenant_id, "F1", Role::Viewer, FieldAction::Read).await);
}

#[tokio::test]
async fn viewer_read_only_override_resolves_per_action() {
    let tenant_id = TenantId::new();
    let harness = harness(tenant_id);

    let written = harness
        .mutator
        .apply_one(
            tenant_id,
            &table_id(TABLE),
            "F1",
            "viewer",
            PermissionFlags::new(true, false, false),
        )
        .await;
    assert!(written.is_ok());

    assert!(allows(&harness, tenant_id, "F1", Role::Viewer, FieldAction::Read).await);
    assert!(!allows(&harness, tenant_id, "F1", Role::Viewer, FieldAction::Write).await);
}

#[tokio::test]
async fn protected_role_override_is_rejected_and_owner_keeps_access() {
    let tenant_id = TenantId::new();
    let harness = harness(tenant_id);

    let rejected = harness
        .mutator
        .apply_one(tenant_id, &table_id(TABLE), "F1", "owner", PermissionFlags::none())
        .await;

    assert!(matches!(rejected, Err(AppError::ProtectedRole(_))));
    assert_eq!(harness.repository.write_calls.load(Ordering::SeqCst), 0);
    assert!(allows(&harness, tenant_id, "F1", Role::Owner, FieldAction::Read).await);
}

#[tokio::test]
async fn batch_with_unknown_field_writes_nothing() {
    let tenant_id = TenantId::new();
    let harness = harness(tenant_id);
    let table = table_id(TABLE);
    let changes = [
        FieldPermissionChange::new("F1", "editor", PermissionFlags::new(true, true, false)),
        FieldPermissionChange::new(
            "F_nonexistent",
            "editor",
            PermissionFlags::new(true, true, false),
        ),
    ];

    let result = harness.mutator.apply_batch(tenant_id, &table, &changes).await;

    let Err(AppError::ValidationFailed(issues)) = result else {
        panic!("expected ValidationFailed");
    };
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].index, 1);
    assert_eq!(harness.repository.row_count(tenant_id, &table).await, 0);
    assert_eq!(harness.repository.write_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn batch_store_failure_leaves_previous_state_and_retry_converges() {
    let tenant_id = TenantId::new();
    let harness = harness(tenant_id);
    let table = table_id(TABLE);
    let changes = [
        FieldPermissionChange::new("F1", "viewer", PermissionFlags::none()),
        FieldPermissionChange::new("F2", "editor", PermissionFlags::new(true, false, false)),
    ];

    harness.repository.fail_writes.store(true, Ordering::SeqCst);
    let failed = harness.mutator.apply_batch(tenant_id, &table, &changes).await;
    assert!(matches!(failed, Err(AppError::StoreUnavailable(_))));
    assert_eq!(harness.repository.row_count(tenant_id, &table).await, 0);
    assert!(!harness.cache.contains(tenant_id, &table));

    harness.repository.fail_writes.store(false, Ordering::SeqCst);
    for _ in 0..2 {
        let applied = harness.mutator.apply_batch(tenant_id, &table, &changes).await;
        assert!(matches!(applied, Ok(ref overrides) if overrides.len() == 2));
    }

    assert_eq!(harness.repository.row_count(tenant_id, &table).await, 2);
    assert!(!allows(&harness, tenant_id, "F1", Role::Viewer, FieldAction::Read).await);
    assert!(!allows(&harness, tenant_id, "F2", Role::Editor, FieldAction::Write).await);
}

#[tokio::test]
async fn duplicate_batch_entries_collapse_to_the_last_one() {
    let tenant_id = TenantId::new();
    let harness = harness(tenant_id);
    let table = table_id(TABLE);
    let changes = [
        FieldPermissionChange::new("F1", "viewer", PermissionFlags::none()),
        FieldPermissionChange::new("F2", "viewer", PermissionFlags::none()),
        FieldPermissionChange::new("F1", "viewer", PermissionFlags::new(true, true, false)),
    ];

    let applied = harness.mutator.apply_batch(tenant_id, &table, &changes).await;

    let Ok(overrides) = applied else {
        panic!("expected batch to apply");
    };
    assert_eq!(overrides.len(), 2);
    assert_eq!(overrides[0].field_id(), &field_id("F1"));
    assert_eq!(overrides[0].flags(), PermissionFlags::new(true, true, false));
    assert!(allows(&harness, tenant_id, "F1", Role::Viewer, FieldAction::Write).await);
}

#[tokio::test]
async fn empty_batch_is_a_no_op() {
    let tenant_id = TenantId::new();
    let harness = harness(tenant_id);

    let applied = harness
        .mutator
        .apply_batch(tenant_id, &table_id(TABLE), &[])
        .await;

    assert!(matches!(applied, Ok(overrides) if overrides.is_empty()));
    assert_eq!(harness.repository.write_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn reset_falls_back_to_defaults() {
    let tenant_id = TenantId::new();
    let harness = harness(tenant_id);
    let table = table_id(TABLE);

    let written = harness
        .mutator
        .apply_one(tenant_id, &table, "F1", "viewer", PermissionFlags::none())
        .await;
    assert!(written.is_ok());
    assert!(!allows(&harness, tenant_id, "F1", Role::Viewer, FieldAction::Read).await);

    let removed = harness.mutator.reset_to_default(tenant_id, &table).await;
    assert!(matches!(removed, Ok(1)));

    assert!(allows(&harness, tenant_id, "F1", Role::Viewer, FieldAction::Read).await);
    assert!(allows(&harness, tenant_id, "F1", Role::Editor, FieldAction::Write).await);
}

#[tokio::test]
async fn clear_all_writes_explicit_denials_for_overridable_roles() {
    let tenant_id = TenantId::new();
    let harness = harness(tenant_id);
    let table = table_id(TABLE);

    let cleared = harness.mutator.clear_all(tenant_id, &table, &[]).await;
    assert!(matches!(cleared, Ok(ref overrides) if overrides.len() == 6));

    for field in ["F1", "F2", "F3"] {
        assert!(!allows(&harness, tenant_id, field, Role::Viewer, FieldAction::Read).await);
        assert!(!allows(&harness, tenant_id, field, Role::Editor, FieldAction::Write).await);
        assert!(allows(&harness, tenant_id, field, Role::Admin, FieldAction::Delete).await);
    }
}

#[tokio::test]
async fn clear_all_skips_protected_roles_in_selection() {
    let tenant_id = TenantId::new();
    let harness = harness(tenant_id);
    let table = table_id(TABLE);

    let cleared = harness
        .mutator
        .clear_all(tenant_id, &table, &[Role::Owner, Role::Viewer])
        .await;

    assert!(matches!(cleared, Ok(ref overrides) if overrides.len() == 3
        && overrides.iter().all(|field_override| field_override.role() == Role::Viewer)));
    assert!(allows(&harness, tenant_id, "F1", Role::Editor, FieldAction::Write).await);
}

#[tokio::test]
async fn strict_template_hides_fields_from_viewers() {
    let tenant_id = TenantId::new();
    let harness = harness(tenant_id);
    let table = table_id(TABLE);

    let applied = harness
        .mutator
        .apply_template(tenant_id, &table, PermissionTemplate::Strict)
        .await;
    assert!(applied.is_ok());

    let visible = harness
        .resolver
        .visible_fields(tenant_id, &table, Role::Viewer)
        .await;
    assert!(matches!(visible, Ok(fields) if fields.is_empty()));
    assert!(allows(&harness, tenant_id, "F2", Role::Editor, FieldAction::Read).await);
    assert!(!allows(&harness, tenant_id, "F2", Role::Editor, FieldAction::Write).await);
}

#[tokio::test]
async fn select_all_toggles_one_action_and_keeps_the_rest() {
    let tenant_id = TenantId::new();
    let harness = harness(tenant_id);
    let table = table_id(TABLE);

    let written = harness
        .mutator
        .apply_one(tenant_id, &table, "F2", "editor", PermissionFlags::new(false, false, true))
        .await;
    assert!(written.is_ok());

    let applied = harness
        .mutator
        .set_action_for_all_fields(tenant_id, &table, Role::Editor, FieldAction::Read, true)
        .await;
    assert!(matches!(applied, Ok(ref overrides) if overrides.len() == 3));

    assert!(allows(&harness, tenant_id, "F2", Role::Editor, FieldAction::Read).await);
    assert!(allows(&harness, tenant_id, "F2", Role::Editor, FieldAction::Delete).await);
    assert!(!allows(&harness, tenant_id, "F2", Role::Editor, FieldAction::Write).await);
    assert!(allows(&harness, tenant_id, "F1", Role::Editor, FieldAction::Write).await);
}

#[tokio::test]
async fn select_all_rejects_protected_role() {
    let tenant_id = TenantId::new();
    let harness = harness(tenant_id);

    let rejected = harness
        .mutator
        .set_action_for_all_fields(
            tenant_id,
            &table_id(TABLE),
            Role::Admin,
            FieldAction::Write,
            false,
        )
        .await;

    assert!(matches!(rejected, Err(AppError::ProtectedRole(_))));
}

#[tokio::test]
async fn select_all_does_not_overwrite_a_concurrent_single_write() {
    let tenant_id = TenantId::new();
    let harness = harness(tenant_id);
    let table = table_id(TABLE);
    harness
        .repository
        .set_load_delay(Some(Duration::from_millis(100)))
        .await;

    let select_all_mutator = harness.mutator.clone();
    let select_all_table = table.clone();
    let select_all = tokio::spawn(async move {
        select_all_mutator
            .set_action_for_all_fields(
                tenant_id,
                &select_all_table,
                Role::Viewer,
                FieldAction::Delete,
                true,
            )
            .await
            .is_ok()
    });

    tokio::time::sleep(Duration::from_millis(20)).await;
    let written = harness
        .mutator
        .apply_one(tenant_id, &table, "F1", "viewer", PermissionFlags::new(false, true, false))
        .await;
    assert!(written.is_ok());
    assert!(matches!(select_all.await, Ok(true)));

    harness.repository.set_load_delay(None).await;
    assert!(!allows(&harness, tenant_id, "F1", Role::Viewer, FieldAction::Read).await);
    assert!(allows(&harness, tenant_id, "F1", Role::Viewer, FieldAction::Write).await);
    assert!(!allows(&harness, tenant_id, "F1", Role::Viewer, FieldAction::Delete).await);
    assert!(allows(&harness, tenant_id, "F2", Role::Viewer, FieldAction::Delete).await);
}

#[tokio::test]
async fn remove_field_drops_only_that_field() {
    let tenant_id = TenantId::new();
    let harness = harness(tenant_id);
    let table = table_id(TABLE);

    let cleared = harness.mutator.clear_all(tenant_id, &table, &[Role::Viewer]).await;
    assert!(cleared.is_ok());

    let removed = harness
        .mutator
        .remove_field(tenant_id, &table, &field_id("F1"))
        .await;
    assert!(matches!(removed, Ok(1)));

    assert!(allows(&harness, tenant_id, "F1", Role::Viewer, FieldAction::Read).await);
    assert!(!allows(&harness, tenant_id, "F3", Role::Viewer, FieldAction::Read).await);
}
