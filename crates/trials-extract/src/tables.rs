//! Table specs and the builder that turns field records into tables.

use serde_json::Value;
use tracing::{debug, info_span};
use trials_model::{CellValue, FieldRecord, Table};

use crate::error::Result;
use crate::extract::{lookup, scalar_text};
use crate::schema::FieldPath;

/// Where one output column takes its value from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSource {
    /// A scalar field of the parent record.
    Field(String),
    /// A path inside the current list element (exploded tables only).
    Element(FieldPath),
    /// A list field of the parent flattened to one string.
    Joined { field: String, separator: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    pub source: ColumnSource,
}

impl ColumnSpec {
    pub fn field(name: &str) -> Self {
        Self::renamed(name, name)
    }

    pub fn renamed(name: &str, field: &str) -> Self {
        Self {
            name: name.to_string(),
            source: ColumnSource::Field(field.to_string()),
        }
    }

    pub fn element(name: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            source: ColumnSource::Element(FieldPath::parse(path)),
        }
    }

    pub fn joined(name: &str, field: &str, separator: &str) -> Self {
        Self {
            name: name.to_string(),
            source: ColumnSource::Joined {
                field: field.to_string(),
                separator: separator.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableShape {
    /// One row per record.
    Singleton,
    /// One row per element of `list_field`; empty lists yield no rows.
    Exploded { list_field: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSpec {
    pub name: String,
    /// Column carrying the parent identifier, always first.
    pub identifier_column: String,
    pub shape: TableShape,
    pub columns: Vec<ColumnSpec>,
}

impl TableSpec {
    pub fn singleton(name: &str, identifier_column: &str, columns: Vec<ColumnSpec>) -> Self {
        Self {
            name: name.to_string(),
            identifier_column: identifier_column.to_string(),
            shape: TableShape::Singleton,
            columns,
        }
    }

    pub fn exploded(
        name: &str,
        identifier_column: &str,
        list_field: &str,
        columns: Vec<ColumnSpec>,
    ) -> Self {
        Self {
            name: name.to_string(),
            identifier_column: identifier_column.to_string(),
            shape: TableShape::Exploded {
                list_field: list_field.to_string(),
            },
            columns,
        }
    }

    pub fn column_names(&self) -> Vec<String> {
        std::iter::once(self.identifier_column.clone())
            .chain(self.columns.iter().map(|column| column.name.clone()))
            .collect()
    }

    /// Appends this spec's rows for one record to `table`.
    fn emit(&self, record: &FieldRecord, table: &mut Table) -> Result<()> {
        match &self.shape {
            TableShape::Singleton => table.push_row(self.row(record, None))?,
            TableShape::Exploded { list_field } => {
                for element in record.list(list_field) {
                    table.push_row(self.row(record, Some(element)))?;
                }
            }
        }
        Ok(())
    }

    fn row(&self, record: &FieldRecord, element: Option<&Value>) -> Vec<CellValue> {
        let mut row = Vec::with_capacity(self.columns.len() + 1);
        row.push(CellValue::text(record.identifier.as_str()));
        for column in &self.columns {
            row.push(cell(record, element, &column.source));
        }
        row
    }
}

fn cell(record: &FieldRecord, element: Option<&Value>, source: &ColumnSource) -> CellValue {
    match source {
        ColumnSource::Field(field) => CellValue::from_option(record.text(field)),
        ColumnSource::Element(path) => element
            .and_then(|element| lookup(element, path))
            .and_then(scalar_text)
            .map_or(CellValue::Missing, CellValue::Text),
        ColumnSource::Joined { field, separator } => {
            let parts: Vec<String> = record.list(field).iter().filter_map(scalar_text).collect();
            CellValue::Text(parts.join(separator))
        }
    }
}

/// Builds one table per spec, in spec order; rows follow record order and,
/// within a record, list element order.
pub fn build_tables(records: &[FieldRecord], specs: &[TableSpec]) -> Result<Vec<Table>> {
    let mut tables = Vec::with_capacity(specs.len());
    for spec in specs {
        let span = info_span!("build_table", table = %spec.name);
        let _guard = span.enter();
        let mut table = Table::new(spec.name.clone(), spec.column_names());
        for record in records {
            spec.emit(record, &mut table)?;
        }
        debug!(rows = table.height(), "table built");
        tables.push(table);
    }
    Ok(tables)
}

/// Tables derived directly from trial records.
pub fn trial_table_specs() -> Vec<TableSpec> {
    vec![
        TableSpec::singleton(
            "trials",
            "nct_id",
            vec![
                ColumnSpec::field("brief_title"),
                ColumnSpec::field("official_title"),
                ColumnSpec::field("lead_sponsor"),
            ],
        ),
        TableSpec::singleton(
            "trial_status",
            "nct_id",
            vec![
                ColumnSpec::field("overall_status"),
                ColumnSpec::field("start_date"),
                ColumnSpec::field("completion_date"),
                ColumnSpec::field("why_stopped"),
            ],
        ),
        TableSpec::exploded(
            "trial_interventions_raw",
            "nct_id",
            "interventions",
            vec![ColumnSpec::element("intervention_name", "name")],
        ),
        TableSpec::exploded(
            "trial_locations",
            "nct_id",
            "locations",
            vec![
                ColumnSpec::element("city", "city"),
                ColumnSpec::element("country", "country"),
            ],
        ),
        TableSpec::exploded(
            "trial_conditions",
            "nct_id",
            "conditions",
            vec![
                ColumnSpec::element("condition", ""),
                ColumnSpec::joined("keywords", "keywords", " "),
            ],
        ),
    ]
}

/// Tables derived directly from drug application records.
pub fn fda_table_specs() -> Vec<TableSpec> {
    vec![TableSpec::singleton(
        "fda_full",
        "record_id",
        [
            "submission_status_date",
            "submission_status",
            "application_number",
            "brand_name",
            "sponsor_name",
            "generic_name",
            "substance_name",
            "manufacturer_name",
        ]
        .into_iter()
        .map(ColumnSpec::field)
        .collect(),
    )]
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use trials_model::FieldValue;

    use super::*;

    fn record(id: &str, conditions: Vec<Value>, keywords: Vec<Value>) -> FieldRecord {
        let mut record = FieldRecord::new(id);
        record.insert("conditions", FieldValue::List(conditions));
        record.insert("keywords", FieldValue::List(keywords));
        record
    }

    #[test]
    fn keywords_are_attached_to_every_exploded_row() {
        let records = vec![record(
            "NCT1",
            vec![json!("asthma"), json!("copd")],
            vec![json!("lung"), json!("inhaler")],
        )];
        let specs: Vec<TableSpec> = trial_table_specs()
            .into_iter()
            .filter(|spec| spec.name == "trial_conditions")
            .collect();
        let tables = build_tables(&records, &specs).unwrap();
        let table = &tables[0];

        assert_eq!(table.columns, vec!["nct_id", "condition", "keywords"]);
        assert_eq!(table.height(), 2);
        assert_eq!(table.cell(0, "condition"), Some(&CellValue::text("asthma")));
        assert_eq!(table.cell(1, "condition"), Some(&CellValue::text("copd")));
        for row in 0..2 {
            assert_eq!(table.cell(row, "keywords"), Some(&CellValue::text("lung inhaler")));
        }
    }

    #[test]
    fn missing_element_keys_become_missing_cells() {
        let mut parent = FieldRecord::new("NCT9");
        parent.insert(
            "locations",
            FieldValue::List(vec![json!({ "city": "Lyon" }), json!("not an object")]),
        );
        let specs: Vec<TableSpec> = trial_table_specs()
            .into_iter()
            .filter(|spec| spec.name == "trial_locations")
            .collect();
        let tables = build_tables(&[parent], &specs).unwrap();
        let table = &tables[0];
        assert_eq!(table.height(), 2);
        assert_eq!(table.cell(0, "city"), Some(&CellValue::text("Lyon")));
        assert_eq!(table.cell(0, "country"), Some(&CellValue::Missing));
        assert_eq!(table.cell(1, "city"), Some(&CellValue::Missing));
    }
}
