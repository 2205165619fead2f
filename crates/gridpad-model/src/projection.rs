use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One exported row: cell text keyed by column display name.
pub type ExportRow = HashMap<String, String>;

/// Read-only view of a [`crate::Table`] handed to the export formatters.
///
/// Rows are keyed by display name rather than column id, so two columns that
/// share a name also share a value (the later column wins).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportTable {
    pub columns: Vec<String>,
    pub rows: Vec<ExportRow>,
}

impl ExportTable {
    /// Values of `row` in column order.
    pub fn values<'a>(&'a self, row: &'a ExportRow) -> Vec<&'a str> {
        row_values(&self.columns, row)
    }
}

/// Values of `row` in `columns` order; missing entries come back as "".
pub fn row_values<'a>(columns: &'a [String], row: &'a ExportRow) -> Vec<&'a str> {
    columns
        .iter()
        .map(|name| row.get(name).map(String::as_str).unwrap_or(""))
        .collect()
}
