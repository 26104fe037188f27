mod common;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use common::{MemoryStore, init_tracing};
use factoria_fixtures::{
    FixtureError, FixtureRecord, FixtureSettings, FixtureStore, InvalidPathReason,
};
use serde_json::{Value, json};

fn memory_store() -> (Arc<MemoryStore>, FixtureStore) {
    let files = Arc::new(MemoryStore::default());
    let store = FixtureStore::with_files(files.clone(), FixtureSettings::default())
        .expect("default settings");
    (files, store)
}

#[test]
fn same_structure_reuses_stored_value_and_writes_once() {
    init_tracing();
    let (files, store) = memory_store();
    let path = Path::new("/suite/user");

    let first = store
        .get_or_create(path, json!({"id": 1, "name": "Ada"}))
        .expect("create");
    let second = store
        .get_or_create(path, json!({"id": 2, "name": "Grace"}))
        .expect("reuse");

    assert_eq!(first, json!({"id": 1, "name": "Ada"}));
    assert_eq!(second, first);
    assert_eq!(files.writes(), 1);
    assert!(files.has_dir(Path::new("/suite/__fixtures__")));
}

#[test]
fn structure_change_rewrites_the_fixture() {
    let (files, store) = memory_store();
    let path = Path::new("/suite/user.json");

    store.get_or_create(path, json!({"id": 1})).expect("create");
    let changed = store
        .get_or_create(path, json!({"id": 1, "email": "a@b.c"}))
        .expect("rewrite");

    assert_eq!(changed, json!({"id": 1, "email": "a@b.c"}));
    assert_eq!(files.writes(), 2);
    let stored: Value = serde_json::from_str(
        &files
            .contents(Path::new("/suite/__fixtures__/user.json"))
            .expect("stored fixture"),
    )
    .expect("json");
    assert_eq!(stored["data"], changed);
}

#[test]
fn written_records_carry_sorted_structure() {
    let (files, store) = memory_store();
    store
        .get_or_create(Path::new("/suite/order"), json!({"total": 3, "items": [{"sku": "x"}]}))
        .expect("create");

    let text = files
        .contents(Path::new("/suite/__fixtures__/order.json"))
        .expect("stored fixture");
    let record: FixtureRecord = serde_json::from_str(&text).expect("record");
    assert_eq!(record.structure, ["items", "items[0].sku", "sku", "total"]);
    assert!(record.digest.is_some());
}

#[test]
fn legacy_raw_fixtures_are_reused() {
    let (files, store) = memory_store();
    files.insert("/suite/__fixtures__/legacy.json", r#"{"id": 42, "tags": ["old"]}"#);

    let value = store
        .get_or_create(Path::new("/suite/legacy"), json!({"id": 1, "tags": ["new"]}))
        .expect("reuse");

    assert_eq!(value, json!({"id": 42, "tags": ["old"]}));
    assert_eq!(files.writes(), 0);
}

#[test]
fn raw_mode_writes_bare_values() {
    let files = Arc::new(MemoryStore::default());
    let settings = FixtureSettings {
        store_structure: false,
        pretty: false,
        ..FixtureSettings::default()
    };
    let store = FixtureStore::with_files(files.clone(), settings).expect("settings");
    store
        .get_or_create(Path::new("/suite/raw"), json!({"id": 1}))
        .expect("create");

    assert_eq!(
        files.contents(Path::new("/suite/__fixtures__/raw.json")).as_deref(),
        Some(r#"{"id":1}"#)
    );
}

#[test]
fn raw_mode_reuses_values_shaped_like_records() {
    let files = Arc::new(MemoryStore::default());
    let settings = FixtureSettings {
        store_structure: false,
        ..FixtureSettings::default()
    };
    let store = FixtureStore::with_files(files.clone(), settings).expect("settings");
    let path = Path::new("/suite/envelope");

    let first = store
        .get_or_create(path, json!({"data": {"a": 1}, "structure": ["x"]}))
        .expect("create");
    let second = store
        .get_or_create(path, json!({"data": {"a": 2}, "structure": ["y"]}))
        .expect("reuse");

    assert_eq!(second, first);
    assert_eq!(files.writes(), 1);
}

#[test]
fn configured_directory_nests_fixture_names() {
    let files = Arc::new(MemoryStore::default());
    let settings = FixtureSettings::default().with_directory("/srv/tests");
    let store = FixtureStore::with_files(files.clone(), settings).expect("settings");

    let resolved = store.resolve(Path::new("/users/admin")).expect("resolve");
    assert_eq!(
        resolved.full_path,
        PathBuf::from("/srv/tests/users/__fixtures__/admin.json")
    );
    let relative = store.resolve(Path::new("admin")).expect("resolve");
    assert_eq!(relative.full_path, PathBuf::from("/srv/tests/__fixtures__/admin.json"));
}

#[test]
fn invalid_paths_are_rejected_before_any_io() {
    let (files, store) = memory_store();
    for (path, expected) in [
        ("", InvalidPathReason::MissingFileName),
        ("relative/user", InvalidPathReason::NotAbsolute),
        ("/suite/user.txt", InvalidPathReason::InvalidExtension(".txt".to_string())),
    ] {
        match store.get_or_create(Path::new(path), json!({})) {
            Err(FixtureError::InvalidPath { reason, .. }) => assert_eq!(reason, expected),
            other => panic!("unexpected result for {path:?}: {other:?}"),
        }
    }
    assert_eq!(files.writes(), 0);
}

#[test]
fn corrupt_fixture_reports_parse_error_with_path() {
    let (files, store) = memory_store();
    files.insert("/suite/__fixtures__/broken.json", "{not json");

    match store.get_or_create(Path::new("/suite/broken"), json!({"id": 1})) {
        Err(FixtureError::Parse { path, .. }) => {
            assert_eq!(path, PathBuf::from("/suite/__fixtures__/broken.json"))
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn write_failures_carry_the_resolved_path() {
    let files = Arc::new(MemoryStore::failing_writes());
    let store = FixtureStore::with_files(files, FixtureSettings::default()).expect("settings");

    let err = store
        .get_or_create(Path::new("/suite/user"), json!({"id": 1}))
        .expect_err("write fails");
    match &err {
        FixtureError::Write { path, .. } => {
            assert_eq!(path, &PathBuf::from("/suite/__fixtures__/user.json"))
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("error writing file"));
}

#[test]
fn read_failures_carry_the_resolved_path() {
    let files = Arc::new(MemoryStore::failing_reads());
    files.insert("/suite/__fixtures__/user.json", r#"{"id": 1}"#);
    let store = FixtureStore::with_files(files.clone(), FixtureSettings::default())
        .expect("settings");

    let err = store
        .get_or_create(Path::new("/suite/user"), json!({"id": 2}))
        .expect_err("read fails");
    match &err {
        FixtureError::Read { path, .. } => {
            assert_eq!(path, &PathBuf::from("/suite/__fixtures__/user.json"))
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("error reading file"));
    assert_eq!(files.writes(), 0);
}

#[test]
fn mkdir_failures_carry_the_fixtures_directory() {
    let files = Arc::new(MemoryStore::failing_mkdir());
    let store = FixtureStore::with_files(files.clone(), FixtureSettings::default())
        .expect("settings");

    let err = store
        .get_or_create(Path::new("/suite/user"), json!({"id": 1}))
        .expect_err("mkdir fails");
    match &err {
        FixtureError::Write { path, source } => {
            assert_eq!(path, &PathBuf::from("/suite/__fixtures__"));
            assert_eq!(source.kind(), std::io::ErrorKind::PermissionDenied);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(files.writes(), 0);
}

#[tokio::test]
async fn async_store_matches_sync_behaviour() {
    let (files, store) = memory_store();
    let path = Path::new("/suite/async");

    let first = store
        .get_or_create_async(path, json!({"id": 1}))
        .await
        .expect("create");
    let second = store
        .get_or_create_async(path, json!({"id": 9}))
        .await
        .expect("reuse");

    assert_eq!(first, second);
    assert_eq!(files.writes(), 1);
}
