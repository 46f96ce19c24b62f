use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid dataset id: {0:?}")]
    InvalidDatasetId(String),
    #[error("row has {actual} cells but table {table} has {expected} columns")]
    RowWidth {
        table: String,
        expected: usize,
        actual: usize,
    },
    #[error("frame conversion failed for table {table}: {source}")]
    Frame {
        table: String,
        #[source]
        source: polars::prelude::PolarsError,
    },
}

pub type Result<T> = std::result::Result<T, ModelError>;
