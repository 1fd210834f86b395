// SQLite data source
// Opens the database file read-only and serves scans with plain SELECTs

use super::DataSource;
use crate::error::{ReportError, Result};
use crate::storage::{table::Table, Column, DataType, Schema, Value};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, ErrorCode, OpenFlags};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A read-only SQLite connection
pub struct SqliteSource {
    conn: Connection,
    path: PathBuf,
}

impl SqliteSource {
    /// Open `path` read-only
    /// A missing file, or a file that is not a database, is a connection error.
    pub fn open(path: &Path) -> Result<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags).map_err(|e| {
            ReportError::Connection(format!("cannot open {}: {}", path.display(), e))
        })?;

        // SQLite opens lazily; touch the schema so a bad file fails here
        let tables: i64 = conn
            .query_row(
                "SELECT count(*) FROM sqlite_master WHERE type = 'table'",
                [],
                |row| row.get(0),
            )
            .map_err(|e| ReportError::Connection(format!("cannot read {}: {}", path.display(), e)))?;

        info!(path = %path.display(), tables, "opened SQLite database");
        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    /// Declared type of every column of `table`, by lowercase column name
    fn declared_types(&self, table: &str) -> Result<HashMap<String, String>> {
        let sql = format!("PRAGMA table_info({})", quote_identifier(table)?);
        let mut stmt = self.conn.prepare(&sql).map_err(classify)?;
        let declared = stmt
            .query_map([], |row| {
                let name: String = row.get(1)?;
                let declared: String = row.get(2)?;
                Ok((name.to_ascii_lowercase(), declared))
            })
            .map_err(classify)?
            .collect::<rusqlite::Result<HashMap<_, _>>>()
            .map_err(classify)?;

        if declared.is_empty() {
            return Err(ReportError::DataAccess(format!("no such table: {}", table)));
        }
        Ok(declared)
    }
}

impl DataSource for SqliteSource {
    fn scan(&self, table: &str, columns: &[&str]) -> Result<Table> {
        let declared = self.declared_types(table)?;
        let schema = Schema::new(
            columns
                .iter()
                .map(|c| {
                    declared
                        .get(&c.to_ascii_lowercase())
                        .map(|decl| Column::new(*c, DataType::from_declared(decl)))
                        .ok_or_else(|| {
                            ReportError::DataAccess(format!("no such column: {}.{}", table, c))
                        })
                })
                .collect::<Result<Vec<_>>>()?,
        );

        let select_list = columns
            .iter()
            .map(|c| quote_identifier(c))
            .collect::<Result<Vec<_>>>()?
            .join(", ");
        let sql = format!("SELECT {} FROM {}", select_list, quote_identifier(table)?);
        debug!(%sql, "scanning SQLite table");

        let mut stmt = self.conn.prepare(&sql).map_err(classify)?;
        let mut rows = stmt.query([]).map_err(classify)?;

        let mut scanned = Table::new(table, schema);
        while let Some(row) = rows.next().map_err(classify)? {
            let values = (0..columns.len())
                .map(|i| convert(row.get_ref(i).map_err(classify)?))
                .collect::<Result<Vec<_>>>()?;
            scanned.insert(values)?;
        }

        debug!(table, rows = scanned.row_count(), "scanned SQLite table");
        Ok(scanned)
    }

    fn describe(&self) -> String {
        format!("sqlite:{}", self.path.display())
    }

    fn close(self: Box<Self>) -> Result<()> {
        let SqliteSource { conn, path } = *self;
        conn.close().map_err(|(_, e)| {
            ReportError::Connection(format!("cannot close {}: {}", path.display(), e))
        })
    }
}

/// Backtick-quote a plain identifier; anything else is a malformed query
fn quote_identifier(name: &str) -> Result<String> {
    let mut chars = name.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        return Err(ReportError::Query(format!("invalid identifier: {:?}", name)));
    }
    Ok(format!("`{}`", name))
}

fn convert(value: ValueRef<'_>) -> Result<Value> {
    match value {
        ValueRef::Null => Ok(Value::Null),
        ValueRef::Integer(i) => Ok(Value::Integer(i)),
        ValueRef::Real(f) => Ok(Value::Float(f)),
        ValueRef::Text(bytes) => std::str::from_utf8(bytes)
            .map(|s| Value::Text(s.to_string()))
            .map_err(|e| ReportError::DataAccess(format!("invalid UTF-8 text: {}", e))),
        ValueRef::Blob(_) => Err(ReportError::DataAccess(
            "BLOB values are not supported".to_string(),
        )),
    }
}

/// Split SQLite failures into connection problems and data access problems
fn classify(err: rusqlite::Error) -> ReportError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, _)
            if matches!(
                failure.code,
                ErrorCode::CannotOpen
                    | ErrorCode::NotADatabase
                    | ErrorCode::DatabaseBusy
                    | ErrorCode::DatabaseLocked
                    | ErrorCode::PermissionDenied
            ) =>
        {
            ReportError::Connection(err.to_string())
        }
        _ => ReportError::DataAccess(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn seeded_database() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.sqlite");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE payments (customerName TEXT, checkNumber TEXT, amount REAL);
             INSERT INTO payments VALUES ('Atelier graphique', 'HQ336336', 6066.78);
             INSERT INTO payments VALUES ('Signal Gift Stores', 'JM555205', NULL);",
        )
        .unwrap();
        conn.close().unwrap();
        (dir, path)
    }

    #[test]
    fn test_scan_reads_rows_in_order() {
        let (_dir, path) = seeded_database();
        let source = SqliteSource::open(&path).unwrap();

        let payments = source.scan("payments", &["checkNumber", "amount"]).unwrap();
        assert_eq!(payments.column_names(), vec!["checkNumber", "amount"]);
        assert_eq!(
            payments.rows[0].values,
            vec![Value::text("HQ336336"), Value::Float(6066.78)]
        );
        assert_eq!(payments.rows[1].values[1], Value::Null);

        Box::new(source).close().unwrap();
    }

    #[test]
    fn test_missing_table_and_column_are_data_access_errors() {
        let (_dir, path) = seeded_database();
        let source = SqliteSource::open(&path).unwrap();

        assert!(matches!(
            source.scan("offices", &["city"]),
            Err(ReportError::DataAccess(_))
        ));
        assert!(matches!(
            source.scan("payments", &["paymentDate"]),
            Err(ReportError::DataAccess(_))
        ));
    }

    #[test]
    fn test_scan_carries_declared_types() {
        let (_dir, path) = seeded_database();
        let source = SqliteSource::open(&path).unwrap();

        let payments = source.scan("payments", &["customerName", "AMOUNT"]).unwrap();
        assert_eq!(payments.column_names(), vec!["customerName", "AMOUNT"]);
        assert_eq!(payments.column(0).data_type, DataType::Text);
        assert_eq!(payments.column(1).data_type, DataType::Float);
    }

    #[test]
    fn test_missing_or_invalid_file_is_connection_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("absent.sqlite");
        assert!(matches!(
            SqliteSource::open(&missing),
            Err(ReportError::Connection(_))
        ));

        let garbage = dir.path().join("garbage.sqlite");
        std::fs::write(&garbage, vec![0x42u8; 4096]).unwrap();
        assert!(matches!(
            SqliteSource::open(&garbage),
            Err(ReportError::Connection(_))
        ));
    }

    #[test]
    fn test_identifiers_are_validated() {
        assert_eq!(quote_identifier("orderdetails").unwrap(), "`orderdetails`");
        assert!(quote_identifier("x; DROP TABLE y").is_err());
        assert!(quote_identifier("").is_err());
    }
}
