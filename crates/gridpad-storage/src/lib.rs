//! Local persistence for gridpad tables.
//!
//! The whole table is persisted as one JSON snapshot under a single fixed key
//! of a [`KeyValueStore`]. This crate exposes:
//! - the `KeyValueStore` seam plus in-memory and SQLite-backed stores
//! - `SnapshotStore`, which saves/loads a [`gridpad_model::Table`] wholesale
//! - snapshot versioning, including migration of unversioned legacy snapshots

mod memory;
mod snapshot;
mod sqlite;
mod store;

pub use memory::MemoryStore;
pub use snapshot::{SnapshotError, SnapshotStore, SNAPSHOT_KEY, SNAPSHOT_VERSION};
pub use sqlite::SqliteStore;
pub use store::{KeyValueStore, StoreError};
