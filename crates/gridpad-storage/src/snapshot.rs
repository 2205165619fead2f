use std::collections::BTreeMap;

use gridpad_model::{Column, ColumnId, Row, RowId, Table};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::store::{KeyValueStore, StoreError};

/// The single slot holding the persisted table.
pub const SNAPSHOT_KEY: &str = "grid-data";

/// Current snapshot schema version.
///
/// Snapshots without a `schemaVersion` field are version 0: the flat legacy
/// row shape `{ "id": .., "<columnId>": "<text>", .. }`.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] StoreError),
    #[error("corrupt snapshot: {reason}")]
    CorruptSnapshot { reason: String },
}

impl SnapshotError {
    fn corrupt(reason: impl Into<String>) -> Self {
        SnapshotError::CorruptSnapshot {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SnapshotError>;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotRef<'a> {
    schema_version: u32,
    columns: &'a [Column],
    rows: &'a [Row],
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotV1 {
    columns: Vec<Column>,
    rows: Vec<Row>,
}

#[derive(Deserialize)]
struct LegacySnapshot {
    columns: Vec<Column>,
    rows: Vec<LegacyRow>,
}

#[derive(Deserialize)]
struct LegacyRow {
    id: RowId,
    #[serde(flatten)]
    cells: BTreeMap<String, Value>,
}

/// Saves and loads a [`Table`] wholesale under [`SNAPSHOT_KEY`].
#[derive(Debug)]
pub struct SnapshotStore<S> {
    store: S,
}

impl<S: KeyValueStore> SnapshotStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Serialize `table` and overwrite the snapshot slot.
    pub fn save(&self, table: &Table) -> Result<()> {
        let json = encode(table).map_err(StoreError::from)?;
        self.store.set(SNAPSHOT_KEY, &json)?;
        log::debug!(
            "saved snapshot ({} columns, {} rows, {} bytes)",
            table.columns().len(),
            table.rows().len(),
            json.len()
        );
        Ok(())
    }

    /// Read the snapshot slot.
    ///
    /// Returns `Ok(None)` when nothing has been saved yet.
    pub fn load(&self) -> Result<Option<Table>> {
        let Some(json) = self.store.get(SNAPSHOT_KEY)? else {
            log::debug!("no snapshot under {SNAPSHOT_KEY:?}");
            return Ok(None);
        };
        decode(&json).map(Some)
    }

    pub fn clear(&self) -> Result<()> {
        self.store.remove(SNAPSHOT_KEY)?;
        Ok(())
    }
}

fn encode(table: &Table) -> serde_json::Result<String> {
    serde_json::to_string(&SnapshotRef {
        schema_version: SNAPSHOT_VERSION,
        columns: table.columns(),
        rows: table.rows(),
    })
}

fn decode(json: &str) -> Result<Table> {
    let value: Value =
        serde_json::from_str(json).map_err(|e| SnapshotError::corrupt(e.to_string()))?;
    let Value::Object(ref fields) = value else {
        return Err(SnapshotError::corrupt("snapshot is not a JSON object"));
    };

    let version = match fields.get("schemaVersion") {
        None => 0,
        Some(v) => v
            .as_u64()
            .ok_or_else(|| SnapshotError::corrupt(format!("invalid schemaVersion {v}")))?,
    };

    let (columns, rows) = match version {
        0 => {
            let legacy: LegacySnapshot = serde_json::from_value(value)
                .map_err(|e| SnapshotError::corrupt(e.to_string()))?;
            log::info!("migrating unversioned snapshot to version {SNAPSHOT_VERSION}");
            migrate_legacy(legacy)?
        }
        1 => {
            let snapshot: SnapshotV1 = serde_json::from_value(value)
                .map_err(|e| SnapshotError::corrupt(e.to_string()))?;
            (snapshot.columns, snapshot.rows)
        }
        other => {
            return Err(SnapshotError::corrupt(format!(
                "unsupported snapshot version {other} (newest supported is {SNAPSHOT_VERSION})"
            )))
        }
    };

    Table::from_parts(columns, rows).map_err(|e| SnapshotError::corrupt(e.to_string()))
}

fn migrate_legacy(legacy: LegacySnapshot) -> Result<(Vec<Column>, Vec<Row>)> {
    let mut rows = Vec::with_capacity(legacy.rows.len());
    for row in legacy.rows {
        let mut cells = BTreeMap::new();
        for (key, value) in row.cells {
            let text = match value {
                Value::Null => continue,
                Value::String(s) => s,
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                Value::Array(_) | Value::Object(_) => {
                    return Err(SnapshotError::corrupt(format!(
                        "row {}: cell {key:?} is not a scalar",
                        row.id
                    )))
                }
            };
            cells.insert(ColumnId::new(key), text);
        }
        rows.push(Row { id: row.id, cells });
    }
    Ok((legacy.columns, rows))
}
