use polars::prelude::PolarsError;
use thiserror::Error;
use trials_model::ModelError;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("table {table} has no column {column}")]
    MissingColumn { table: String, column: String },

    #[error("dedupe failed for table {table}: {source}")]
    Frame {
        table: String,
        #[source]
        source: PolarsError,
    },

    #[error(transparent)]
    Model(#[from] ModelError),
}

pub type Result<T> = std::result::Result<T, ResolveError>;
