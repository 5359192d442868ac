use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    #[error("no data in selected range {start}..={end} for `{field}`")]
    NoDataInRange { field: String, start: i64, end: i64 },

    #[error("record has no field `{field}` (available: {available})")]
    MissingField { field: String, available: String },

    #[error("field `{field}` is not {expected}: {found}")]
    FieldType {
        field: String,
        expected: &'static str,
        found: String,
    },

    #[error("result file name {} does not match {expected}", path.display())]
    ResultFileName { path: PathBuf, expected: &'static str },

    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("plotting failed: {0}")]
    Plot(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
