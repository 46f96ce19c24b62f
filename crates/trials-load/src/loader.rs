//! Replace-semantics loading of built tables into SQLite.

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OptionalExtension, params_from_iter};
use tracing::{debug, info, info_span};
use trials_model::{CellValue, Table};

use crate::error::{LoadError, Result};
use crate::views::{DERIVED_VIEWS, VIEWS_VERSION};

/// Quotes an SQL identifier.
fn ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Loaded tables and their row counts, in load order.
    pub tables: Vec<(String, usize)>,
    /// Views recreated after the load.
    pub views: Vec<String>,
}

/// One connection to the relational store, held for a pipeline run.
pub struct SqliteLoader {
    conn: Connection,
}

impl SqliteLoader {
    /// Opens (creating if needed) the database file and its directory.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|source| LoadError::Directory {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let conn = Connection::open(path).map_err(|source| LoadError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| LoadError::Open {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        Ok(Self { conn })
    }

    /// Replaces every given table and recreates the derived views, all in
    /// one transaction.
    pub fn load(&mut self, tables: &[Table]) -> Result<LoadReport> {
        let span = info_span!("load", tables = tables.len());
        let _guard = span.enter();

        let tx = self.conn.transaction()?;
        for view in DERIVED_VIEWS {
            tx.execute_batch(&format!("DROP VIEW IF EXISTS {}", ident(view.name)))?;
        }

        let mut report = LoadReport::default();
        for table in tables {
            let table_err = |source| LoadError::Table {
                table: table.name.clone(),
                source,
            };
            let columns: Vec<String> = table
                .columns
                .iter()
                .map(|column| format!("{} TEXT", ident(column)))
                .collect();
            tx.execute_batch(&format!(
                "DROP TABLE IF EXISTS {name}; CREATE TABLE {name} ({columns});",
                name = ident(&table.name),
                columns = columns.join(", "),
            ))
            .map_err(table_err)?;

            if !table.columns.is_empty() {
                let placeholders = vec!["?"; table.columns.len()].join(", ");
                let mut stmt = tx
                    .prepare(&format!(
                        "INSERT INTO {} VALUES ({placeholders})",
                        ident(&table.name)
                    ))
                    .map_err(table_err)?;
                for row in &table.rows {
                    stmt.execute(params_from_iter(row.iter().map(CellValue::as_text)))
                        .map_err(table_err)?;
                }
            }
            debug!(table = %table.name, rows = table.height(), "table loaded");
            report.tables.push((table.name.clone(), table.height()));
        }

        for view in DERIVED_VIEWS {
            let mut available = true;
            for required in view.requires {
                if !table_exists(&tx, required)? {
                    available = false;
                    break;
                }
            }
            if !available {
                debug!(view = view.name, "skipping view, required table missing");
                continue;
            }
            tx.execute_batch(&format!(
                "CREATE VIEW {} AS {}",
                ident(view.name),
                view.select
            ))
            .map_err(|source| LoadError::View {
                view: view.name.to_string(),
                source,
            })?;
            report.views.push(view.name.to_string());
        }

        tx.pragma_update(None, "user_version", VIEWS_VERSION)?;
        tx.commit()?;
        info!(
            tables = report.tables.len(),
            views = report.views.len(),
            "relational store loaded"
        );
        Ok(report)
    }

    pub fn user_version(&self) -> Result<i32> {
        Ok(self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?)
    }

    pub fn table_exists(&self, name: &str) -> Result<bool> {
        table_exists(&self.conn, name)
    }

    pub fn row_count(&self, name: &str) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", ident(name)),
            [],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// All rows of a table or view, in insertion order for tables.
    pub fn rows(&self, name: &str) -> Result<Vec<Vec<Option<String>>>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT * FROM {}", ident(name)))?;
        let width = stmt.column_count();
        let rows = stmt
            .query_map([], |row| {
                (0..width)
                    .map(|idx| {
                        let value: rusqlite::types::Value = row.get(idx)?;
                        Ok(match value {
                            rusqlite::types::Value::Null => None,
                            rusqlite::types::Value::Integer(n) => Some(n.to_string()),
                            rusqlite::types::Value::Real(f) => Some(f.to_string()),
                            rusqlite::types::Value::Text(text) => Some(text),
                            rusqlite::types::Value::Blob(bytes) => {
                                Some(String::from_utf8_lossy(&bytes).into_owned())
                            }
                        })
                    })
                    .collect::<rusqlite::Result<Vec<_>>>()
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}

fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    Ok(conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [name],
            |_| Ok(()),
        )
        .optional()?
        .is_some())
}
