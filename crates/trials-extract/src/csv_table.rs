//! CSV interchange for built tables.
//!
//! Missing cells are written as empty fields and read back as missing.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, WriterBuilder};
use tracing::debug;
use trials_model::{CellValue, Table};

use crate::error::{ExtractError, Result};

/// `<dir>/<table>.csv`
pub fn table_path(dir: &Path, table: &str) -> PathBuf {
    dir.join(format!("{table}.csv"))
}

/// Serializes a table to any writer, header first.
pub fn write_csv<W: Write>(table: &Table, writer: W, path: &Path) -> Result<()> {
    let csv_err = |source| ExtractError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = WriterBuilder::new().from_writer(writer);
    writer.write_record(&table.columns).map_err(csv_err)?;
    for row in &table.rows {
        writer
            .write_record(row.iter().map(|cell| cell.as_text().unwrap_or("")))
            .map_err(csv_err)?;
    }
    writer.flush().map_err(|source| ExtractError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn write_table(table: &Table, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| ExtractError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let file = fs::File::create(path).map_err(|source| ExtractError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write_csv(table, file, path)?;
    debug!(table = %table.name, rows = table.height(), path = %path.display(), "csv written");
    Ok(())
}

/// Writes every table under `dir`, returning the written paths in order.
pub fn write_tables(dir: &Path, tables: &[Table]) -> Result<Vec<PathBuf>> {
    tables
        .iter()
        .map(|table| {
            let path = table_path(dir, &table.name);
            write_table(table, &path).map(|()| path)
        })
        .collect()
}

/// Reads a CSV written by [`write_table`] back into a table named `name`.
pub fn read_table(name: &str, path: &Path) -> Result<Table> {
    let csv_err = |source| ExtractError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(csv_err)?;
    let columns: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(|header| header.trim_matches('\u{feff}').to_string())
        .collect();
    let mut table = Table::new(name, columns);
    for record in reader.records() {
        let record = record.map_err(csv_err)?;
        let row = record
            .iter()
            .map(|value| {
                if value.is_empty() {
                    CellValue::Missing
                } else {
                    CellValue::text(value)
                }
            })
            .collect();
        table.push_row(row)?;
    }
    Ok(table)
}
