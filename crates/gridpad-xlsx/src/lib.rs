//! Spreadsheet export for gridpad tables.
//!
//! [`export_xlsx`] turns a table projection (column display names plus rows
//! keyed by those names) into a single-sheet `.xlsx` workbook held in memory.
//! It never touches the file system; offering the bytes for download is the
//! caller's job.

mod widths;

use std::collections::HashSet;

use gridpad_model::{row_values, ExportRow};
use rust_xlsxwriter::{
    ColNum, DocProperties, ExcelDateTime, RowNum, Table, TableColumn, TableStyle, Workbook,
    XlsxError,
};
use thiserror::Error;

pub use widths::{column_widths, MIN_COLUMN_WIDTH, WIDTH_PADDING};

/// Name of the only worksheet in an exported workbook.
pub const WORKSHEET_NAME: &str = "Dados";
/// Name of the structured table covering the exported data.
pub const TABLE_NAME: &str = "TabelaDados";
pub const EXTENSION: &str = "xlsx";

#[derive(Debug, Error)]
pub enum XlsxExportError {
    #[error("xlsx writer error: {0}")]
    Writer(#[from] XlsxError),
    #[error("xlsx export task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// `base` with the spreadsheet extension appended.
pub fn file_name(base: &str) -> String {
    format!("{}.{EXTENSION}", base.trim())
}

/// Build the workbook for `columns`/`rows` and return its bytes.
///
/// The workbook is assembled on the blocking pool; the returned future must be
/// awaited before the buffer is used. Identical input always produces
/// identical bytes.
pub async fn export_xlsx(
    columns: &[String],
    rows: &[ExportRow],
) -> Result<Vec<u8>, XlsxExportError> {
    let columns = columns.to_vec();
    let rows = rows.to_vec();
    tokio::task::spawn_blocking(move || write_workbook(&columns, &rows)).await?
}

fn write_workbook(columns: &[String], rows: &[ExportRow]) -> Result<Vec<u8>, XlsxExportError> {
    let mut workbook = Workbook::new();
    // Pin the document timestamp so the package bytes only depend on the data.
    let properties =
        DocProperties::new().set_creation_datetime(&ExcelDateTime::from_ymd(2000, 1, 1)?);
    workbook.set_properties(&properties);

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(WORKSHEET_NAME)?;

    if !columns.is_empty() {
        let headers = table_headers(columns);
        let last_col = ColNum::try_from(columns.len() - 1)
            .map_err(|_| XlsxError::RowColumnLimitError)?;
        // A table needs at least one data row below its header; an empty
        // dataset gets a single blank one.
        let last_row =
            RowNum::try_from(rows.len().max(1)).map_err(|_| XlsxError::RowColumnLimitError)?;

        let table_columns: Vec<TableColumn> = headers
            .iter()
            .map(|header| TableColumn::new().set_header(header))
            .collect();
        let table = Table::new()
            .set_name(TABLE_NAME)
            .set_style(TableStyle::Medium2)
            .set_banded_rows(true)
            .set_autofilter(true)
            .set_columns(&table_columns);
        worksheet.add_table(0, 0, last_row, last_col, &table)?;

        for (col, header) in (0..=last_col).zip(&headers) {
            worksheet.write_string(0, col, header)?;
        }

        for (row, values) in (1..).zip(rows.iter().map(|r| row_values(columns, r))) {
            for (col, value) in (0..=last_col).zip(values) {
                if !value.is_empty() {
                    worksheet.write_string(row, col, value)?;
                }
            }
        }

        for (col, width) in (0..=last_col).zip(column_widths(columns, rows)) {
            worksheet.set_column_width(col, width)?;
        }
    }

    let buffer = workbook.save_to_buffer()?;
    log::debug!(
        "built xlsx workbook: {} columns, {} rows, {} bytes",
        columns.len(),
        rows.len(),
        buffer.len()
    );
    Ok(buffer)
}

/// Header labels for the structured table.
///
/// Excel requires table headers to be unique (case-insensitively) and
/// non-blank, so repeated names get a numeric suffix (`Nome`, `Nome2`) and
/// blank names become `ColumnN`.
fn table_headers(columns: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    columns
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let base = if name.trim().is_empty() {
                format!("Column{}", idx + 1)
            } else {
                name.clone()
            };
            let mut candidate = base.clone();
            let mut suffix = 2;
            while !seen.insert(candidate.to_lowercase()) {
                candidate = format!("{base}{suffix}");
                suffix += 1;
            }
            candidate
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_are_made_unique_in_order() {
        let columns: Vec<String> = ["Nome", "nome", "Email", "Nome", " "]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(
            table_headers(&columns),
            vec!["Nome", "nome2", "Email", "Nome3", "Column5"]
        );
    }

    #[test]
    fn file_name_appends_extension() {
        assert_eq!(file_name(" meu-relatorio "), "meu-relatorio.xlsx");
    }
}
