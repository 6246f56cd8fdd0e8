//! Error taxonomy for the pipeline.
//!
//! Only fatal conditions live here. Undefined arithmetic (zero denominators,
//! degenerate correlations) is never an error: it resolves to
//! [`Measure::Undefined`](crate::kpi::Measure) or a documented zero.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("cannot open input {path}: {source}")]
    InputMissing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("input is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("malformed record at line {line}: {source}")]
    MalformedRecord {
        line: u64,
        #[source]
        source: csv::Error,
    },
    #[error("malformed input: {0}")]
    Csv(#[from] csv::Error),
    #[error("line {line}: cannot parse {field} value '{value}'")]
    InvalidField {
        line: u64,
        field: &'static str,
        value: String,
    },
    #[error("ride {ride_id}: {source}")]
    InvalidHour {
        ride_id: String,
        #[source]
        source: CategorizeError,
    },
    #[error("input contains no rides")]
    EmptyInput,
    #[error("cannot load config {path}: {message}")]
    Config { path: PathBuf, message: String },
    #[error("cannot write {path}: {message}")]
    OutputWrite { path: PathBuf, message: String },
}

/// Raised by the hour categorizer for values outside `0..=23`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CategorizeError {
    #[error("hour {0} is outside 0..=23")]
    InvalidInput(i64),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
