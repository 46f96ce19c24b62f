//! Applying a name mapping to a table, then removing the duplicates it
//! creates.

use std::collections::HashSet;

use polars::prelude::{AnyValue, BooleanChunked, DataFrame, NewChunkedArray};
use tracing::debug;
use trials_model::{CellValue, Table, frame_to_table, table_to_frame};

use crate::error::{ResolveError, Result};
use crate::matcher::NameMapping;

/// Lower-cases `column`, replaces mapped names, keeps unmapped names as
/// they are and drops exact duplicate rows. The result is named `output`.
pub fn apply_mapping(
    table: &Table,
    column: &str,
    mapping: &NameMapping,
    output: &str,
) -> Result<Table> {
    let idx = table
        .column_index(column)
        .ok_or_else(|| ResolveError::MissingColumn {
            table: table.name.clone(),
            column: column.to_string(),
        })?;

    let mut recoded = Table::new(output, table.columns.clone());
    for row in &table.rows {
        let mut row = row.clone();
        if let Some(CellValue::Text(name)) = row.get_mut(idx) {
            let lowered = name.to_lowercase();
            *name = mapping.resolve(&lowered).to_string();
        }
        recoded.push_row(row)?;
    }

    let mut df = table_to_frame(&recoded)?;
    drop_duplicate_rows(&mut df).map_err(|source| ResolveError::Frame {
        table: output.to_string(),
        source,
    })?;
    let deduped = frame_to_table(output, &df)?;
    debug!(
        table = output,
        before = recoded.height(),
        after = deduped.height(),
        "mapping applied"
    );
    Ok(deduped)
}

fn cell_key(df: &DataFrame, name: &str, idx: usize) -> polars::prelude::PolarsResult<String> {
    Ok(match df.column(name)?.get(idx)? {
        AnyValue::Null => "\u{0}".to_string(),
        AnyValue::String(value) => format!("={value}"),
        AnyValue::StringOwned(value) => format!("={value}"),
        other => format!("={other}"),
    })
}

/// Keeps the first occurrence of every distinct row, preserving order.
fn drop_duplicate_rows(df: &mut DataFrame) -> polars::prelude::PolarsResult<()> {
    if df.height() == 0 {
        return Ok(());
    }
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    let mut seen = HashSet::new();
    let mut keep = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let mut composite = String::new();
        for name in &names {
            composite.push_str(&cell_key(df, name, idx)?);
            composite.push('\u{1f}');
        }
        keep.push(seen.insert(composite));
    }
    let mask = BooleanChunked::from_slice("dedupe".into(), &keep);
    *df = df.filter(&mask)?;
    Ok(())
}
