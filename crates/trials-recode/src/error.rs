use thiserror::Error;
use trials_extract::ExtractError;
use trials_model::ModelError;

#[derive(Debug, Error)]
pub enum RecodeError {
    #[error("invalid recode pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The recode table was built from a different label set than the data.
    #[error("trial {trial}: category label {label:?} is not in the recode table")]
    UnknownLabel { trial: String, label: String },

    #[error("trial {trial}: count {value:?} for {label:?} is not a whole number")]
    InvalidCount {
        trial: String,
        label: String,
        value: String,
    },

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

pub type Result<T> = std::result::Result<T, RecodeError>;
