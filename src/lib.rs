// sales-reports - canned business reports over a sales organization database
// This is the library root that exposes the public API

pub mod app;
pub mod config;
pub mod error;
pub mod output;
pub mod query;
pub mod reports;
pub mod source;
pub mod storage;

// Re-export commonly used types for convenience
pub use config::RunConfig;
pub use error::{ReportError, Result};
pub use output::OutputFormat;
pub use reports::{FailurePolicy, ReportFailure, ReportId, ReportRunner, RunSummary};
pub use source::{DataSource, DatabaseTarget, MemoryCatalog, Session, SqliteSource};
pub use storage::{table::Table, Column, DataType, Row, Schema, Value};
