#![deny(unsafe_code)]

pub mod csv_table;
pub mod error;
pub mod extract;
pub mod schema;
pub mod tables;

pub use csv_table::{read_table, table_path, write_csv, write_table, write_tables};
pub use error::{ExtractError, Result};
pub use extract::{lookup, scalar_text};
pub use schema::{
    BASELINE_MEASURES_PATH, FieldKind, FieldPath, FieldSpec, IdentifierRule, PathSegment, Schema,
};
pub use tables::{
    ColumnSource, ColumnSpec, TableShape, TableSpec, build_tables, fda_table_specs,
    trial_table_specs,
};
