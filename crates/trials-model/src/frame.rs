//! Conversion between [`Table`] and Polars frames.
//!
//! Every column is materialized as a nullable string column; missing cells
//! become nulls and nulls come back as [`CellValue::Missing`].

use polars::prelude::{AnyValue, Column, DataFrame, NamedFrom, Series};

use crate::{CellValue, ModelError, Result, Table};

/// Build a DataFrame with one string column per table column.
pub fn table_to_frame(table: &Table) -> Result<DataFrame> {
    let mut columns: Vec<Column> = Vec::with_capacity(table.columns.len());
    for (idx, name) in table.columns.iter().enumerate() {
        let values: Vec<Option<String>> = table
            .rows
            .iter()
            .map(|row| row.get(idx).and_then(CellValue::as_text).map(str::to_string))
            .collect();
        columns.push(Series::new(name.as_str().into(), values).into());
    }
    DataFrame::new(columns).map_err(|source| ModelError::Frame {
        table: table.name.clone(),
        source,
    })
}

/// Rebuild a table from a DataFrame, keeping the frame's column order.
pub fn frame_to_table(name: &str, df: &DataFrame) -> Result<Table> {
    let columns: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|column| column.to_string())
        .collect();
    let mut table = Table::new(name, columns.clone());
    for idx in 0..df.height() {
        let mut row = Vec::with_capacity(columns.len());
        for column in &columns {
            let series = df.column(column).map_err(|source| ModelError::Frame {
                table: name.to_string(),
                source,
            })?;
            row.push(any_to_cell(series.get(idx).unwrap_or(AnyValue::Null)));
        }
        table.push_row(row)?;
    }
    Ok(table)
}

fn any_to_cell(value: AnyValue<'_>) -> CellValue {
    match value {
        AnyValue::Null => CellValue::Missing,
        AnyValue::String(s) => CellValue::text(s),
        AnyValue::StringOwned(s) => CellValue::text(s.as_str()),
        other => CellValue::text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_conversion_keeps_missing_cells() {
        let mut table = Table::new(
            "trial_locations",
            vec!["nct_id".to_string(), "city".to_string()],
        );
        table
            .push_row(vec![CellValue::text("NCT1"), CellValue::text("Boston")])
            .unwrap();
        table
            .push_row(vec![CellValue::text("NCT1"), CellValue::Missing])
            .unwrap();

        let df = table_to_frame(&table).unwrap();
        assert_eq!(df.height(), 2);

        let back = frame_to_table("trial_locations", &df).unwrap();
        assert_eq!(back, table);
    }
}
