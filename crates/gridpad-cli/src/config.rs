use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand, ValueEnum};
use directories::ProjectDirs;

/// Base file name used when `export` is run without `--name`.
pub const DEFAULT_EXPORT_NAME: &str = "meu-relatorio";
const STORE_FILE_NAME: &str = "gridpad.sqlite3";

#[derive(Parser, Debug)]
#[command(name = "gridpad", version, about = "Edit a local table and export it as XLSX or PDF.")]
pub struct Args {
    /// SQLite file holding the saved table (default: the platform data directory).
    #[arg(long, env = "GRIDPAD_STORE", value_name = "PATH", global = true)]
    pub store: Option<PathBuf>,

    /// Directory exports are written to.
    #[arg(
        long,
        env = "GRIDPAD_OUT_DIR",
        value_name = "PATH",
        default_value = ".",
        global = true
    )]
    pub out_dir: PathBuf,

    /// Write logs to this file instead of the terminal.
    #[arg(long, env = "GRIDPAD_LOG_FILE", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Increase log verbosity (repeatable).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the table.
    Show,
    /// Append a column.
    AddColumn { name: String },
    /// Change a column's display name.
    RenameColumn { id: String, name: String },
    /// Remove a column and its values from every row.
    DeleteColumn { id: String },
    /// Append an empty row.
    AddRow,
    /// Remove a row.
    DeleteRow { id: String },
    /// Set the text of one cell.
    Set {
        row: String,
        column: String,
        value: String,
    },
    /// Export the table.
    Export {
        #[arg(value_enum)]
        format: ExportFormat,
        /// Base file name; the extension is added automatically.
        #[arg(long, default_value = DEFAULT_EXPORT_NAME)]
        name: String,
    },
    /// Forget the saved table and start over from the starter data.
    Reset,
}

impl Command {
    /// Whether the command changes the table and needs a save afterwards.
    pub fn mutates(&self) -> bool {
        !matches!(self, Command::Show | Command::Export { .. } | Command::Reset)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Xlsx,
    Pdf,
}

impl Args {
    /// Resolve the store path, falling back to the per-user data directory.
    pub fn store_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.store {
            return Ok(path.clone());
        }
        let dirs = ProjectDirs::from("", "", "gridpad")
            .ok_or_else(|| anyhow!("unable to determine a data directory; pass --store"))?;
        Ok(dirs.data_dir().join(STORE_FILE_NAME))
    }

    pub fn log_level(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}
