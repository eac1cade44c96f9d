//! AnimData Text Library
//!
//! This library converts AnimData records to and from the two human-editable
//! formats: a tab-separated table (one row per record) and a JSON array.

pub mod json;
pub mod txt;

pub use json::{read_json, records_from_json, records_to_json, write_json};
pub use txt::{read_txt, records_from_txt, records_to_txt, write_txt};

use animdata_core::ValidationError;

/// Result type for animdata-text operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for animdata-text operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("AnimData core error: {0}")]
    Core(#[from] animdata_core::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Tabbed text error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid record at index {index}: {source}")]
    JsonRecord {
        index: usize,
        source: ValidationError,
    },

    #[error("Missing column (column_name={column_name:?})")]
    MissingColumn { column_name: String },

    #[error("Missing cell (row={row}, column={column}, column_name={column_name:?})")]
    MissingCell {
        row: usize,
        column: usize,
        column_name: String,
    },

    #[error(
        "Cannot convert cell value {value:?} to integer (row={row}, column={column}, column_name={column_name:?})"
    )]
    NotAnInteger {
        row: usize,
        column: usize,
        column_name: String,
        value: String,
    },

    #[error("Invalid record field: {source} (row={row}, column_name={column_name:?})")]
    InvalidField {
        row: usize,
        column_name: Option<String>,
        source: ValidationError,
    },
}

impl Error {
    /// Data row (0-based, header excluded) of a tabbed text error
    pub fn row(&self) -> Option<usize> {
        match self {
            Error::MissingCell { row, .. }
            | Error::NotAnInteger { row, .. }
            | Error::InvalidField { row, .. } => Some(*row),
            _ => None,
        }
    }
}
