//! Error types for the dashboard pipeline.

use thiserror::Error;

/// Violations of the [`Dataset`](crate::data::model::Dataset) invariants.
#[derive(Debug, Error, PartialEq)]
pub enum DatasetError {
    #[error("duplicate column name '{0}'")]
    DuplicateColumn(String),

    #[error("column '{column}' has {found} values, expected {expected}")]
    RaggedColumn {
        column: String,
        expected: usize,
        found: usize,
    },

    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// The file parsed but does not have the shape the dashboard needs.
#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    #[error("missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("column '{0}' must be numeric")]
    NotNumeric(String),
}

/// Main error type for pipeline operations.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Nothing has been uploaded yet.
    #[error("no file uploaded yet")]
    MissingFile,

    /// Neither the delimited-text nor the spreadsheet parser accepted the upload.
    #[error("unreadable file: not delimited text ({delimited}) and not a spreadsheet ({spreadsheet})")]
    Format {
        delimited: String,
        spreadsheet: String,
    },

    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("export failed: {0}")]
    Export(String),
}

impl From<rust_xlsxwriter::XlsxError> for DashboardError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        DashboardError::Export(e.to_string())
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, DashboardError>;
