//! The editing session behind every command.
//!
//! A [`Session`] owns the in-memory [`Table`] and the snapshot store it was
//! loaded from. Saving and exporting never fail outward: every outcome is a
//! [`Notice`] the host shows to the user, and failures are logged.
//!
//! A saved table that could not be read is never overwritten implicitly:
//! saves stay blocked until the user runs an explicit [`Session::reset`].

use std::fmt;
use std::path::{Path, PathBuf};

use gridpad_model::{Column, ColumnId, Row, RowId, Table, TableError};
use gridpad_storage::{KeyValueStore, SnapshotError, SnapshotStore};
use log::Level;

use crate::download::save_download;

/// A user-visible outcome of a save, export or startup load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: Level,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Level::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Level::Warn, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Level::Error, message)
    }

    fn new(level: Level, message: impl Into<String>) -> Self {
        let notice = Self {
            level,
            message: message.into(),
        };
        log::debug!("notice ({level}): {}", notice.message);
        notice
    }

    pub fn is_error(&self) -> bool {
        self.level == Level::Error
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.level {
            Level::Error => "error",
            Level::Warn => "warning",
            _ => "ok",
        };
        write!(f, "{label}: {}", self.message)
    }
}

/// Trimmed export base name, or a notice when it is blank or not a plain
/// file name.
fn export_base(name: &str) -> Result<&str, Notice> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Notice::error("Informe um nome para o arquivo."));
    }
    if trimmed.contains(['/', '\\']) || trimmed == "." || trimmed == ".." {
        return Err(Notice::error(format!(
            "Nome de arquivo inválido: {trimmed:?} (sem barras ou diretórios)."
        )));
    }
    Ok(trimmed)
}

pub struct Session<S> {
    table: Table,
    snapshots: SnapshotStore<S>,
    out_dir: PathBuf,
    /// Why saving is refused, if it is.
    save_blocked: Option<String>,
}

impl<S: KeyValueStore> Session<S> {
    /// Load the saved table from `store`.
    ///
    /// Falls back to [`Table::starter`] when nothing was saved or the saved
    /// data cannot be read; the returned notice explains any fallback.
    pub fn open(store: S, out_dir: impl Into<PathBuf>) -> (Self, Option<Notice>) {
        let snapshots = SnapshotStore::new(store);
        let (table, notice, save_blocked) = match snapshots.load() {
            Ok(Some(table)) => (table, None, None),
            Ok(None) => (Table::starter(), None, None),
            Err(err @ SnapshotError::CorruptSnapshot { .. }) => (
                Table::starter(),
                Some(Notice::warning(format!(
                    "Dados salvos ilegíveis; começando com a tabela inicial. \
                     Nada será salvo até `reset` ({err})."
                ))),
                Some(format!("os dados salvos não puderam ser lidos ({err})")),
            ),
            Err(err @ SnapshotError::StorageUnavailable(_)) => (
                Table::starter(),
                Some(Notice::error(format!(
                    "Não foi possível carregar os dados salvos ({err})."
                ))),
                Some(format!("os dados salvos não puderam ser carregados ({err})")),
            ),
        };
        if let Some(reason) = &save_blocked {
            log::info!("saves blocked: {reason}");
        }

        let session = Self {
            table,
            snapshots,
            out_dir: out_dir.into(),
            save_blocked,
        };
        (session, notice)
    }

    /// Refuse every later [`save`](Self::save) with `reason`.
    ///
    /// The host uses this when it had to fall back to a store that does not
    /// outlive the process.
    pub fn block_saves(&mut self, reason: impl Into<String>) {
        self.save_blocked = Some(reason.into());
    }

    pub fn can_save(&self) -> bool {
        self.save_blocked.is_none()
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    pub fn add_column(&mut self, name: &str) -> Result<ColumnId, TableError> {
        self.table.add_column(name)
    }

    pub fn rename_column(&mut self, id: &str, name: &str) -> Result<(), TableError> {
        self.table.rename_column(id, name)
    }

    pub fn delete_column(&mut self, id: &str) -> Option<Column> {
        self.table.delete_column(id)
    }

    pub fn add_row(&mut self) -> RowId {
        self.table.add_row()
    }

    pub fn delete_row(&mut self, id: &str) -> Option<Row> {
        self.table.delete_row(id)
    }

    pub fn set_cell(&mut self, row_id: &str, column_id: &str, value: &str) -> Result<(), TableError> {
        self.table.set_cell(row_id, column_id, value)
    }

    /// Persist the current table.
    pub fn save(&self) -> Notice {
        if let Some(reason) = &self.save_blocked {
            return Notice::error(format!("Alterações não salvas: {reason}."));
        }
        match self.snapshots.save(&self.table) {
            Ok(()) => Notice::info("Dados salvos."),
            Err(err) => Notice::error(format!("Não foi possível salvar os dados ({err}).")),
        }
    }

    /// Drop the saved snapshot and go back to the starter table.
    ///
    /// This is the only way to discard a snapshot that could not be read, and
    /// it unblocks saving afterwards.
    pub fn reset(&mut self) -> Notice {
        if let Err(err) = self.snapshots.clear() {
            return Notice::error(format!("Não foi possível apagar os dados salvos ({err})."));
        }
        self.table = Table::starter();
        self.save_blocked = None;
        Notice::info("Tabela reiniciada.")
    }

    /// Export to `<out_dir>/<name>.xlsx`.
    pub async fn export_spreadsheet(&self, name: &str) -> Notice {
        let base = match export_base(name) {
            Ok(base) => base,
            Err(notice) => return notice,
        };
        let export = self.table.projection();

        let bytes = match gridpad_xlsx::export_xlsx(&export.columns, &export.rows).await {
            Ok(bytes) => bytes,
            Err(err) => return Notice::error(format!("Falha ao gerar a planilha ({err}).")),
        };
        match save_download(&self.out_dir, &gridpad_xlsx::file_name(base), &bytes) {
            Ok(path) => Notice::info(format!("Planilha exportada para {}.", path.display())),
            Err(err) => Notice::error(format!("Falha ao salvar a planilha ({err:#}).")),
        }
    }

    /// Export to `<out_dir>/<name>.pdf`.
    pub fn export_document(&self, name: &str) -> Notice {
        let base = match export_base(name) {
            Ok(base) => base,
            Err(notice) => return notice,
        };
        if let Err(err) = std::fs::create_dir_all(&self.out_dir) {
            return Notice::error(format!(
                "Não foi possível criar {} ({err}).",
                self.out_dir.display()
            ));
        }
        let export = self.table.projection();

        match gridpad_pdf::export_pdf(&export.columns, &export.rows, &self.out_dir, base) {
            Ok(path) => Notice::info(format!("PDF exportado para {}.", path.display())),
            Err(err) => Notice::error(format!("Falha ao gerar o PDF ({err}).")),
        }
    }
}
