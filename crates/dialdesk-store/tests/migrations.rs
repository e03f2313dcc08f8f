use dialdesk_store::db::StoreOptions;
use dialdesk_store::error::{StoreError, StoreErrorKind};
use dialdesk_store::Store;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn migrations_apply_once() {
    let store = Store::open_in_memory().expect("open in memory");
    store.migrate().expect("migrate");
    store.migrate().expect("migrate again");

    let version: i64 = store
        .connection()
        .query_row("SELECT version FROM dialdesk_schema LIMIT 1;", [], |row| {
            row.get(0)
        })
        .expect("schema version");
    assert_eq!(version, 2);
    assert_eq!(store.schema_version().expect("schema version"), 2);
}

#[test]
fn migrations_reject_newer_database() {
    let store = Store::open_in_memory().expect("open in memory");
    store.migrate().expect("migrate");
    store
        .connection()
        .execute("UPDATE dialdesk_schema SET version = 99;", [])
        .expect("bump version");

    let err = store.migrate().expect_err("newer schema");
    assert!(matches!(err, StoreError::Migration(_)));
}

#[test]
fn schema_rejects_lease_without_dialing_status() {
    let store = Store::open_in_memory().expect("open in memory");
    store.migrate().expect("migrate");

    let result = store.connection().execute(
        "INSERT INTO dial_records
         (id, organization_id, phone_number, assigned_to, dialing_status, currently_dialing_by, created_at, updated_at)
         VALUES ('r1', 'org', '5550100', 'agent', 'pending', 'agent', 0, 0);",
        [],
    );
    assert!(result.is_err());

    let result = store.connection().execute(
        "INSERT INTO dial_records
         (id, organization_id, phone_number, assigned_to, dialing_status, created_at, updated_at)
         VALUES ('r2', 'org', '5550101', 'agent', 'dialing', 0, 0);",
        [],
    );
    assert!(result.is_err());
}

#[test]
fn current_schema_migrates_without_write_lock() {
    let temp = TempDir::new().expect("temp dir");
    let path = temp.path().join("dialdesk.sqlite3");
    let short = StoreOptions {
        busy_timeout: Duration::from_millis(50),
    };

    let fresh = Store::open_with_options(&path, &short).expect("open fresh");
    let waiting = Store::open_with_options(&path, &short).expect("open waiting");
    fresh
        .connection()
        .execute_batch("BEGIN IMMEDIATE;")
        .expect("take write lock");
    let err = waiting.migrate().expect_err("schema needs the write lock");
    assert_eq!(err.kind(), StoreErrorKind::Unavailable);
    fresh
        .connection()
        .execute_batch("ROLLBACK;")
        .expect("drop write lock");

    fresh.migrate().expect("migrate");
    fresh
        .connection()
        .execute_batch("BEGIN IMMEDIATE;")
        .expect("take write lock");
    waiting.migrate().expect("up-to-date schema needs no lock");
    assert_eq!(waiting.schema_version().expect("schema version"), 2);
}
