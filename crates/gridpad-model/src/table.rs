use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{ColumnId, ExportTable, RowId};

/// Errors raised by [`Table`] mutations.
///
/// A failed mutation never changes the table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("column name cannot be empty")]
    EmptyName,
    #[error("row not found: {0}")]
    RowNotFound(RowId),
    #[error("column not found: {0}")]
    ColumnNotFound(ColumnId),
    #[error("duplicate column id: {0}")]
    DuplicateColumnId(ColumnId),
    #[error("duplicate row id: {0}")]
    DuplicateRowId(RowId),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    /// Display label. Not required to be unique.
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub id: RowId,
    /// Cell text keyed by column id. Missing entries read as "".
    #[serde(default)]
    pub cells: BTreeMap<ColumnId, String>,
}

impl Row {
    /// Cell text for `column`, or "" when the row has no entry for it.
    pub fn cell(&self, column: &str) -> &str {
        self.cells.get(column).map(String::as_str).unwrap_or("")
    }
}

/// The editable grid: ordered columns and ordered rows.
///
/// Insertion order is display order for both collections. Every cell key held
/// by a row names a column that currently exists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Row>,
}

impl Table {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The seed table shown before anything has been saved.
    pub fn starter() -> Self {
        let nome = ColumnId::new("col-1");
        let email = ColumnId::new("col-2");
        Self {
            columns: vec![
                Column {
                    id: nome.clone(),
                    name: "Nome".to_string(),
                },
                Column {
                    id: email.clone(),
                    name: "Email".to_string(),
                },
            ],
            rows: vec![Row {
                id: RowId::new("row-1"),
                cells: BTreeMap::from([
                    (nome, "João Silva".to_string()),
                    (email, "joao@exemplo.com".to_string()),
                ]),
            }],
        }
    }

    /// Rebuild a table from previously persisted parts.
    ///
    /// Duplicate ids are rejected. Cell entries naming a column that is not in
    /// `columns` are dropped.
    pub fn from_parts(columns: Vec<Column>, mut rows: Vec<Row>) -> Result<Self, TableError> {
        let mut column_ids = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !column_ids.insert(column.id.as_str()) {
                return Err(TableError::DuplicateColumnId(column.id.clone()));
            }
        }

        let mut row_ids = HashSet::with_capacity(rows.len());
        for row in &mut rows {
            if !row_ids.insert(row.id.clone()) {
                return Err(TableError::DuplicateRowId(row.id.clone()));
            }
            let before = row.cells.len();
            row.cells.retain(|key, _| column_ids.contains(key.as_str()));
            if row.cells.len() != before {
                log::warn!(
                    "dropped {} orphaned cell(s) from row {}",
                    before - row.cells.len(),
                    row.id
                );
            }
        }

        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn column(&self, id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id.as_str() == id)
    }

    pub fn row(&self, id: &str) -> Option<&Row> {
        self.rows.iter().find(|r| r.id.as_str() == id)
    }

    /// Cell text for the pair, or "" when the row, column, or entry is absent.
    pub fn cell(&self, row: &str, column: &str) -> &str {
        self.row(row).map(|r| r.cell(column)).unwrap_or("")
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() && self.rows.is_empty()
    }

    /// Append a column, returning its freshly generated id.
    ///
    /// Every existing row gets an empty cell for the new column.
    pub fn add_column(&mut self, name: &str) -> Result<ColumnId, TableError> {
        if name.trim().is_empty() {
            return Err(TableError::EmptyName);
        }

        let id = ColumnId::generate();
        for row in &mut self.rows {
            row.cells.insert(id.clone(), String::new());
        }
        self.columns.push(Column {
            id: id.clone(),
            name: name.to_string(),
        });
        Ok(id)
    }

    pub fn rename_column(&mut self, id: &str, name: &str) -> Result<(), TableError> {
        if name.trim().is_empty() {
            return Err(TableError::EmptyName);
        }
        let column = self
            .columns
            .iter_mut()
            .find(|c| c.id.as_str() == id)
            .ok_or_else(|| TableError::ColumnNotFound(ColumnId::new(id)))?;
        column.name = name.to_string();
        Ok(())
    }

    /// Remove a column and its cell in every row.
    ///
    /// Returns the removed column, or `None` if no column has that id.
    pub fn delete_column(&mut self, id: &str) -> Option<Column> {
        let idx = self.columns.iter().position(|c| c.id.as_str() == id)?;
        let column = self.columns.remove(idx);
        for row in &mut self.rows {
            row.cells.remove(id);
        }
        Some(column)
    }

    /// Append a row with an empty cell for every current column.
    pub fn add_row(&mut self) -> RowId {
        let id = RowId::generate();
        let cells = self
            .columns
            .iter()
            .map(|c| (c.id.clone(), String::new()))
            .collect();
        self.rows.push(Row {
            id: id.clone(),
            cells,
        });
        id
    }

    pub fn delete_row(&mut self, id: &str) -> Option<Row> {
        let idx = self.rows.iter().position(|r| r.id.as_str() == id)?;
        Some(self.rows.remove(idx))
    }

    pub fn set_cell(
        &mut self,
        row_id: &str,
        column_id: &str,
        value: impl Into<String>,
    ) -> Result<(), TableError> {
        let column_id = self
            .column(column_id)
            .map(|c| c.id.clone())
            .ok_or_else(|| TableError::ColumnNotFound(ColumnId::new(column_id)))?;
        let row = self
            .rows
            .iter_mut()
            .find(|r| r.id.as_str() == row_id)
            .ok_or_else(|| TableError::RowNotFound(RowId::new(row_id)))?;
        row.cells.insert(column_id, value.into());
        Ok(())
    }

    /// Read-only projection keyed by column display name, as consumed by the
    /// export formatters.
    pub fn projection(&self) -> ExportTable {
        ExportTable {
            columns: self.columns.iter().map(|c| c.name.clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| {
                    self.columns
                        .iter()
                        .map(|c| (c.name.clone(), row.cell(c.id.as_str()).to_string()))
                        .collect()
                })
                .collect(),
        }
    }
}
