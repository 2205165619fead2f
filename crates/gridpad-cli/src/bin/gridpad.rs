use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use gridpad_cli::{logging, Args, Command, ExportFormat, Notice, Session};
use gridpad_model::Table;
use gridpad_storage::{KeyValueStore, MemoryStore, SqliteStore};

/// Open the SQLite store, or an in-memory stand-in plus the notice explaining
/// why nothing will be saved.
fn open_store(args: &Args) -> Result<(Box<dyn KeyValueStore>, Option<Notice>)> {
    let path = args.store_path()?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(err) = std::fs::create_dir_all(parent) {
            log::warn!("could not create {}: {err}", parent.display());
        }
    }

    match SqliteStore::open_path(&path) {
        Ok(store) => {
            log::debug!("using store {}", path.display());
            Ok((Box::new(store), None))
        }
        Err(err) => {
            let notice = Notice::error(format!(
                "Armazenamento indisponível em {} ({err}); as alterações não serão salvas.",
                path.display()
            ));
            Ok((Box::new(MemoryStore::new()), Some(notice)))
        }
    }
}

fn print_table(table: &Table) {
    let columns = table.columns();
    if columns.is_empty() {
        println!("(sem colunas)");
    }

    let mut header = vec![String::from("id")];
    header.extend(columns.iter().map(|c| format!("{} [{}]", c.name, c.id)));
    let mut lines = vec![header];
    for row in table.rows() {
        let mut line = vec![row.id.to_string()];
        line.extend(columns.iter().map(|c| row.cell(c.id.as_str()).to_string()));
        lines.push(line);
    }

    let widths: Vec<usize> = (0..lines[0].len())
        .map(|i| lines.iter().map(|l| l[i].chars().count()).max().unwrap_or(0))
        .collect();
    for line in &lines {
        let cells: Vec<String> = line
            .iter()
            .zip(widths.iter().copied())
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect();
        println!("{}", cells.join(" | ").trim_end());
    }
}

fn report(notice: &Notice) {
    if notice.is_error() {
        eprintln!("{notice}");
    } else {
        println!("{notice}");
    }
}

async fn run(args: &Args) -> Result<bool> {
    let (store, store_notice) = open_store(args)?;
    let mut ok = true;

    let (mut session, notice) = Session::open(store, args.out_dir.clone());
    if let Some(notice) = &store_notice {
        ok &= !notice.is_error();
        session.block_saves("armazenamento indisponível");
        report(notice);
    }
    if let Some(notice) = &notice {
        report(notice);
    }

    let outcome: Result<Option<String>, String> = match &args.command {
        Command::Show => {
            print_table(session.table());
            Ok(None)
        }
        Command::AddColumn { name } => session
            .add_column(name)
            .map(|id| Some(format!("Coluna criada: {id}")))
            .map_err(|err| err.to_string()),
        Command::RenameColumn { id, name } => session
            .rename_column(id, name)
            .map(|()| None)
            .map_err(|err| err.to_string()),
        Command::DeleteColumn { id } => match session.delete_column(id) {
            Some(column) => Ok(Some(format!("Coluna removida: {}", column.name))),
            None => Err(format!("column not found: {id}")),
        },
        Command::AddRow => Ok(Some(format!("Linha criada: {}", session.add_row()))),
        Command::DeleteRow { id } => match session.delete_row(id) {
            Some(_) => Ok(None),
            None => Err(format!("row not found: {id}")),
        },
        Command::Set { row, column, value } => session
            .set_cell(row, column, value)
            .map(|()| None)
            .map_err(|err| err.to_string()),
        Command::Export { format, name } => {
            let notice = match format {
                ExportFormat::Xlsx => session.export_spreadsheet(name).await,
                ExportFormat::Pdf => session.export_document(name),
            };
            ok &= !notice.is_error();
            report(&notice);
            Ok(None)
        }
        Command::Reset => {
            let notice = session.reset();
            ok &= !notice.is_error();
            report(&notice);
            Ok(None)
        }
    };

    match outcome {
        Ok(message) => {
            if let Some(message) = message {
                println!("{message}");
            }
            if args.command.mutates() {
                let notice = session.save();
                ok &= !notice.is_error();
                report(&notice);
            }
        }
        Err(message) => {
            log::debug!("command failed: {message}");
            eprintln!("error: {message}");
            ok = false;
        }
    }

    Ok(ok)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    logging::init(args.log_level(), args.log_file.as_deref())?;

    if run(&args).await? {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
