use std::path::PathBuf;

use thiserror::Error;
use trials_model::ModelError;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("{schema} record has no identifier at `{path}`")]
    MissingIdentifier { schema: String, path: String },

    #[error("record {index}: {source}")]
    AtRecord {
        index: usize,
        #[source]
        source: Box<ExtractError>,
    },

    #[error("failed to canonicalize record for digest: {0}")]
    Digest(#[source] serde_json::Error),

    #[error("no schema for dataset {0}")]
    UnknownDataset(String),

    #[error("csv error at {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Model(#[from] ModelError),
}

pub type Result<T> = std::result::Result<T, ExtractError>;
