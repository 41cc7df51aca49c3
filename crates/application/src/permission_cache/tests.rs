use std::sync::atomic::Ordering;
use std::time::Duration;

use fieldward_core::TenantId;
use fieldward_domain::{PermissionFlags, Role};

use crate::test_fakes::{TABLE, field_id, fixture, table_id};

#[tokio::test]
async fn get_reads_through_once_then_serves_cached_snapshot() {
    let tenant_id = TenantId::new();
    let (repository, _, cache) = fixture(tenant_id);
    let table = table_id(TABLE);

    assert!(!cache.contains(tenant_id, &table));
    assert!(cache.get(tenant_id, &table).await.is_ok());
    assert!(cache.get(tenant_id, &table).await.is_ok());

    assert!(cache.contains(tenant_id, &table));
    assert_eq!(repository.list_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn invalidate_forces_reload_with_new_generation() {
    let tenant_id = TenantId::new();
    let (repository, store, cache) = fixture(tenant_id);
    let table = table_id(TABLE);

    let before = cache.get(tenant_id, &table).await;
    assert!(matches!(before, Ok(snapshot) if snapshot.entries().is_empty()));

    let written = store
        .upsert(tenant_id, &table, "F1", "viewer", PermissionFlags::none())
        .await;
    assert!(written.is_ok());
    cache.invalidate(tenant_id, &table);

    let after = cache.get(tenant_id, &table).await;
    assert!(matches!(
        after,
        Ok(snapshot) if snapshot.flags_for(&field_id("F1"), Role::Viewer) == Some(PermissionFlags::none())
    ));
    assert_eq!(repository.list_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn invalidate_all_drops_every_table() {
    let tenant_id = TenantId::new();
    let (_, _, cache) = fixture(tenant_id);
    let first = table_id(TABLE);
    let second = table_id("tbl_other");

    assert!(cache.get(tenant_id, &first).await.is_ok());
    assert!(cache.get(tenant_id, &second).await.is_ok());
    cache.invalidate_all();

    assert!(!cache.contains(tenant_id, &first));
    assert!(!cache.contains(tenant_id, &second));
}

#[tokio::test]
async fn load_racing_an_invalidation_is_not_installed() {
    let tenant_id = TenantId::new();
    let (repository, store, cache) = fixture(tenant_id);
    let table = table_id(TABLE);
    repository
        .set_load_delay(Some(Duration::from_millis(100)))
        .await;

    let slow_cache = cache.clone();
    let slow_table = table.clone();
    let slow_read = tokio::spawn(async move {
        slow_cache
            .get(tenant_id, &slow_table)
            .await
            .map(|snapshot| snapshot.entries().len())
    });

    tokio::time::sleep(Duration::from_millis(20)).await;
    let written = store
        .upsert(tenant_id, &table, "F2", "editor", PermissionFlags::none())
        .await;
    assert!(written.is_ok());
    cache.invalidate(tenant_id, &table);

    let stale_len = slow_read.await;
    assert!(matches!(stale_len, Ok(Ok(0))));
    assert!(!cache.contains(tenant_id, &table));

    repository.set_load_delay(None).await;
    let fresh = cache.get(tenant_id, &table).await;
    assert!(matches!(fresh, Ok(snapshot) if snapshot.entries().len() == 1));
}

#[tokio::test]
async fn cancelled_load_leaves_cache_empty() {
    let tenant_id = TenantId::new();
    let (repository, _, cache) = fixture(tenant_id);
    let table = table_id(TABLE);
    repository
        .set_load_delay(Some(Duration::from_millis(200)))
        .await;

    let cancelled =
        tokio::time::timeout(Duration::from_millis(10), cache.get(tenant_id, &table)).await;
    assert!(cancelled.is_err());
    assert!(!cache.contains(tenant_id, &table));
}

#[tokio::test]
async fn invalidating_another_table_keeps_in_flight_load() {
    let tenant_id = TenantId::new();
    let (repository, _, cache) = fixture(tenant_id);
    let table = table_id(TABLE);
    let other = table_id("tbl_other");
    repository
        .set_load_delay(Some(Duration::from_millis(100)))
        .await;

    let slow_cache = cache.clone();
    let slow_table = table.clone();
    let slow_read =
        tokio::spawn(async move { slow_cache.get(tenant_id, &slow_table).await.is_ok() });

    tokio::time::sleep(Duration::from_millis(20)).await;
    cache.invalidate(tenant_id, &other);

    assert!(matches!(slow_read.await, Ok(true)));
    assert!(cache.contains(tenant_id, &table));
}

#[tokio::test]
async fn invalidate_all_during_load_skips_install() {
    let tenant_id = TenantId::new();
    let (repository, _, cache) = fixture(tenant_id);
    let table = table_id(TABLE);
    repository
        .set_load_delay(Some(Duration::from_millis(100)))
        .await;

    let slow_cache = cache.clone();
    let slow_table = table.clone();
    let slow_read =
        tokio::spawn(async move { slow_cache.get(tenant_id, &slow_table).await.is_ok() });

    tokio::time::sleep(Duration::from_millis(20)).await;
    cache.invalidate_all();

    assert!(matches!(slow_read.await, Ok(true)));
    assert!(!cache.contains(tenant_id, &table));
}
