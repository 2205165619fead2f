//! PDF report export for gridpad tables.
//!
//! Unlike the spreadsheet export, [`export_pdf`] is synchronous and saves the
//! document itself: it lays the table out over as many A4 pages as needed,
//! renders it, and writes `<base>.pdf` into the target directory.

pub mod layout;
pub mod metrics;
mod render;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use gridpad_model::ExportRow;
use thiserror::Error;

pub use layout::{layout_document, DocumentLayout, PageLayout, PlacedRow, RowKind};

/// Fixed title printed at the top of the first page.
pub const REPORT_TITLE: &str = "Sistema da Denise - Exportação de Dados";
pub const EXTENSION: &str = "pdf";

#[derive(Debug, Error)]
pub enum PdfExportError {
    #[error("pdf error: {0}")]
    Pdf(#[from] printpdf::Error),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// `base` with the document extension appended.
pub fn file_name(base: &str) -> String {
    format!("{}.{EXTENSION}", base.trim())
}

/// Timestamp printed under the title.
pub fn generated_at_now() -> String {
    Local::now().format("%d/%m/%Y, %H:%M:%S").to_string()
}

/// Render the report to PDF bytes without touching the file system.
pub fn render_pdf(
    columns: &[String],
    rows: &[ExportRow],
    generated_at: &str,
) -> Result<Vec<u8>, PdfExportError> {
    let layout = layout_document(REPORT_TITLE, generated_at, columns, rows);
    log::debug!(
        "laid out pdf report: {} columns, {} rows, {} pages",
        columns.len(),
        rows.len(),
        layout.pages.len()
    );
    render::render(REPORT_TITLE, &layout)
}

/// Render the report and save it as `<dir>/<base>.pdf`, returning the path.
pub fn export_pdf(
    columns: &[String],
    rows: &[ExportRow],
    dir: &Path,
    base: &str,
) -> Result<PathBuf, PdfExportError> {
    let bytes = render_pdf(columns, rows, &generated_at_now())?;
    let path = dir.join(file_name(base));

    let write = |path: &Path| -> std::io::Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        out.write_all(&bytes)?;
        out.flush()
    };
    write(&path).map_err(|source| PdfExportError::Write {
        path: path.clone(),
        source,
    })?;

    log::info!("saved pdf report to {}", path.display());
    Ok(path)
}
