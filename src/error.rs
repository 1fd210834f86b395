//! Error types for sales-reports.

use thiserror::Error;

/// Errors raised while opening a session, scanning tables, evaluating a
/// report or writing its output.
#[derive(Error, Debug)]
pub enum ReportError {
    /// The database could not be opened or is not usable.
    #[error("connection error: {0}")]
    Connection(String),

    /// A table or column is missing, or a stored value could not be coerced.
    #[error("data access error: {0}")]
    DataAccess(String),

    /// A query or seed script was built incorrectly.
    #[error("query error: {0}")]
    Query(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReportError {
    /// Short label for the error class, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            ReportError::Connection(_) => "connection",
            ReportError::DataAccess(_) => "data_access",
            ReportError::Query(_) => "query",
            ReportError::Io(_) => "io",
            ReportError::Csv(_) => "csv",
            ReportError::Json(_) => "json",
        }
    }
}

/// Result type alias for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;
