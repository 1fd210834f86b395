// Source module - where report tables come from
// A Session owns one opened DataSource for the length of a run

pub mod memory;
pub mod script;
pub mod sqlite;

use crate::error::Result;
use crate::storage::table::Table;
use std::path::PathBuf;
use tracing::info;

pub use memory::MemoryCatalog;
pub use script::{ScriptParser, ScriptStatement};
pub use sqlite::SqliteSource;

/// A read-only relational collaborator
pub trait DataSource {
    /// Materialize `columns` of `table`, in stored row order
    ///
    /// Fails with `ReportError::DataAccess` when the table or a column is absent.
    fn scan(&self, table: &str, columns: &[&str]) -> Result<Table>;

    /// Human-readable description, for logs
    fn describe(&self) -> String;

    /// Release the underlying resources
    fn close(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

/// Which collaborator a run reads from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseTarget {
    /// An SQLite database file, opened read-only
    Sqlite(PathBuf),
    /// An SQL seed script loaded into memory
    Script(PathBuf),
}

/// One opened data source
///
/// Call `close` when done; dropping the session also releases the source.
pub struct Session {
    source: Box<dyn DataSource>,
}

impl Session {
    pub fn open(target: &DatabaseTarget) -> Result<Self> {
        let source: Box<dyn DataSource> = match target {
            DatabaseTarget::Sqlite(path) => Box::new(SqliteSource::open(path)?),
            DatabaseTarget::Script(path) => Box::new(MemoryCatalog::load_script(path)?),
        };
        Ok(Self::from_source(source))
    }

    pub fn from_source(source: Box<dyn DataSource>) -> Self {
        info!(source = %source.describe(), "session opened");
        Self { source }
    }

    pub fn source(&self) -> &dyn DataSource {
        self.source.as_ref()
    }

    pub fn close(self) -> Result<()> {
        let description = self.source.describe();
        self.source.close()?;
        info!(source = %description, "session closed");
        Ok(())
    }
}
