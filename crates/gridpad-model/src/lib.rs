//! `gridpad-model` defines the in-memory table edited by gridpad.
//!
//! The crate is intentionally self-contained so it can be reused by:
//! - the snapshot persistence layer (`gridpad-storage`)
//! - the `.xlsx` and `.pdf` export formatters (via [`ExportTable`])
//! - any host that owns a [`Table`] and drives its CRUD operations

mod id;
mod projection;
mod table;

pub use id::{ColumnId, RowId};
pub use projection::{row_values, ExportRow, ExportTable};
pub use table::{Column, Row, Table, TableError};

fn new_uuid() -> uuid::Uuid {
    #[cfg(not(target_arch = "wasm32"))]
    {
        uuid::Uuid::new_v4()
    }

    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::atomic::{AtomicU64, Ordering};

        static COUNTER: AtomicU64 = AtomicU64::new(1);
        uuid::Uuid::from_u128(COUNTER.fetch_add(1, Ordering::Relaxed) as u128)
    }
}
