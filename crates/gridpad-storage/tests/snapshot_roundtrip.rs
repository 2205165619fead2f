use gridpad_model::Table;
use gridpad_storage::{
    KeyValueStore, MemoryStore, SnapshotError, SnapshotStore, SqliteStore, StoreError,
    SNAPSHOT_KEY,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn populated_table() -> Table {
    let mut table = Table::new();
    let nome = table.add_column("Nome").unwrap();
    let email = table.add_column("Email").unwrap();
    let r1 = table.add_row();
    table.add_row();
    table.set_cell(r1.as_str(), nome.as_str(), "João Silva").unwrap();
    table
        .set_cell(r1.as_str(), email.as_str(), "joao@exemplo.com")
        .unwrap();
    table
}

#[test]
fn missing_snapshot_is_not_an_error() {
    let snapshots = SnapshotStore::new(MemoryStore::new());
    assert_eq!(snapshots.load().unwrap(), None);
}

#[test]
fn empty_table_round_trips() {
    let snapshots = SnapshotStore::new(MemoryStore::new());
    snapshots.save(&Table::new()).unwrap();
    assert_eq!(snapshots.load().unwrap(), Some(Table::new()));
}

#[test]
fn save_overwrites_previous_snapshot() {
    let snapshots = SnapshotStore::new(MemoryStore::new());
    snapshots.save(&Table::starter()).unwrap();

    let table = populated_table();
    snapshots.save(&table).unwrap();

    assert_eq!(snapshots.store().len(), 1);
    assert_eq!(snapshots.load().unwrap(), Some(table));
}

#[test]
fn sqlite_snapshot_survives_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("gridpad.sqlite3");
    let table = populated_table();

    {
        let snapshots = SnapshotStore::new(SqliteStore::open_path(&path).expect("open store"));
        snapshots.save(&table).expect("save");
    }

    let snapshots = SnapshotStore::new(SqliteStore::open_path(&path).expect("reopen store"));
    assert_eq!(snapshots.load().expect("load"), Some(table));

    snapshots.clear().expect("clear");
    assert_eq!(snapshots.load().expect("load after clear"), None);
}

#[test]
fn sqlite_shared_memory_connections_see_the_same_slot() {
    let uri = "file:gridpad_snapshot_shared?mode=memory&cache=shared";
    let writer = SnapshotStore::new(SqliteStore::open_uri(uri).expect("open writer"));
    let reader = SnapshotStore::new(SqliteStore::open_uri(uri).expect("open reader"));

    writer.save(&Table::starter()).unwrap();
    assert_eq!(reader.load().unwrap(), Some(Table::starter()));
}

#[test]
fn quota_exhaustion_is_storage_unavailable() {
    let snapshots = SnapshotStore::new(MemoryStore::with_quota(16));
    let err = snapshots.save(&populated_table()).unwrap_err();
    assert!(matches!(
        err,
        SnapshotError::StorageUnavailable(StoreError::QuotaExceeded { .. })
    ));
    // Nothing partial was written.
    assert_eq!(snapshots.load().unwrap(), None);
}

#[test]
fn unparseable_json_is_corrupt() {
    let store = MemoryStore::new();
    store.set(SNAPSHOT_KEY, "{not json").unwrap();
    let err = SnapshotStore::new(store).load().unwrap_err();
    assert!(matches!(err, SnapshotError::CorruptSnapshot { .. }));
}

#[test]
fn wrong_structure_is_corrupt() {
    for raw in [
        "[]",
        "42",
        r#"{"schemaVersion":1,"columns":"nope","rows":[]}"#,
        r#"{"schemaVersion":1,"columns":[{"id":"c"}],"rows":[]}"#,
        r#"{"schemaVersion":"1","columns":[],"rows":[]}"#,
        r#"{"columns":[],"rows":[{"id":"r","c":{"nested":true}}]}"#,
    ] {
        let store = MemoryStore::new();
        store.set(SNAPSHOT_KEY, raw).unwrap();
        let err = SnapshotStore::new(store).load().unwrap_err();
        assert!(
            matches!(err, SnapshotError::CorruptSnapshot { .. }),
            "{raw} should be corrupt, got {err:?}"
        );
    }
}

#[test]
fn duplicate_ids_are_corrupt() {
    let store = MemoryStore::new();
    store
        .set(
            SNAPSHOT_KEY,
            r#"{"schemaVersion":1,"columns":[{"id":"c","name":"A"},{"id":"c","name":"B"}],"rows":[]}"#,
        )
        .unwrap();
    let err = SnapshotStore::new(store).load().unwrap_err();
    assert!(matches!(err, SnapshotError::CorruptSnapshot { .. }));
}

#[test]
fn newer_snapshot_versions_are_rejected() {
    let store = MemoryStore::new();
    store
        .set(SNAPSHOT_KEY, r#"{"schemaVersion":2,"columns":[],"rows":[]}"#)
        .unwrap();
    match SnapshotStore::new(store).load() {
        Err(SnapshotError::CorruptSnapshot { reason }) => {
            assert!(reason.contains("unsupported snapshot version 2"), "{reason}");
        }
        other => panic!("expected corrupt snapshot, got {other:?}"),
    }
}

#[test]
fn legacy_flat_rows_are_migrated() {
    let store = MemoryStore::new();
    store
        .set(
            SNAPSHOT_KEY,
            r#"{"columns":[{"id":"col-1","name":"Nome"},{"id":"col-2","name":"Email"}],
                "rows":[{"id":"row-1","col-1":"João Silva","col-2":"joao@exemplo.com"}]}"#,
        )
        .unwrap();

    let table = SnapshotStore::new(store).load().unwrap().unwrap();
    assert_eq!(table, Table::starter());
}

#[test]
fn legacy_orphaned_cells_are_dropped() {
    let store = MemoryStore::new();
    store
        .set(
            SNAPSHOT_KEY,
            r#"{"columns":[{"id":"col-1","name":"Nome"}],
                "rows":[{"id":"row-1","col-1":"a","col-deleted":"stale"}]}"#,
        )
        .unwrap();

    let table = SnapshotStore::new(store).load().unwrap().unwrap();
    assert_eq!(table.rows()[0].cells.len(), 1);
    assert_eq!(table.cell("row-1", "col-deleted"), "");
}

#[derive(Debug, Clone)]
enum Step {
    AddColumn(String),
    AddRow,
    Set(usize, usize, String),
    DeleteColumn(usize),
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        "[A-Za-z ]{1,8}".prop_map(Step::AddColumn),
        Just(Step::AddRow),
        (any::<usize>(), any::<usize>(), ".{0,12}").prop_map(|(r, c, v)| Step::Set(r, c, v)),
        any::<usize>().prop_map(Step::DeleteColumn),
    ]
}

proptest! {
    #[test]
    fn any_table_round_trips(steps in prop::collection::vec(step(), 0..24)) {
        let mut table = Table::new();
        for step in steps {
            match step {
                Step::AddColumn(name) => {
                    let _ = table.add_column(&name);
                }
                Step::AddRow => {
                    table.add_row();
                }
                Step::Set(r, c, v) => {
                    if !table.rows().is_empty() && !table.columns().is_empty() {
                        let row = table.rows()[r % table.rows().len()].id.clone();
                        let col = table.columns()[c % table.columns().len()].id.clone();
                        table.set_cell(row.as_str(), col.as_str(), v).unwrap();
                    }
                }
                Step::DeleteColumn(c) => {
                    if !table.columns().is_empty() {
                        let col = table.columns()[c % table.columns().len()].id.clone();
                        table.delete_column(col.as_str());
                    }
                }
            }
        }

        let snapshots = SnapshotStore::new(MemoryStore::new());
        snapshots.save(&table).unwrap();
        prop_assert_eq!(snapshots.load().unwrap(), Some(table));
    }
}
