use std::path::PathBuf;

use thiserror::Error;

/// Every failure the pipeline stages can surface. Stage code never panics on bad
/// input; it reports the offending path, row or column through one of these.
#[derive(Error, Debug)]
pub enum SoilError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Rows are 1-based data rows (header excluded).
    #[error("{path}: row {row}, column {column}: cannot parse {value:?} as a number")]
    Parse {
        path: PathBuf,
        row: usize,
        column: String,
        value: String,
    },

    #[error("missing required column {column}")]
    MissingColumn { column: String },

    #[error("row {row}: identity key field {column} is missing")]
    MissingKey { row: usize, column: String },

    #[error("row {row}: coordinate {column} is missing")]
    MissingCoordinate { row: usize, column: String },

    #[error("schema mismatch: {0}")]
    Schema(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("params error: {0}")]
    Params(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SoilError>;

impl SoilError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv { path: path.into(), source }
    }
}
