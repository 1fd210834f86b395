// In-memory catalog
// Holds tables built from a seed script and serves scans from them

use super::script::{ScriptParser, ScriptStatement};
use super::DataSource;
use crate::error::{ReportError, Result};
use crate::storage::{table::Table, Column, Schema, Value};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Tables by lowercase name
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    tables: HashMap<String, Table>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from the text of a seed script
    pub fn from_script(sql: &str) -> Result<Self> {
        let mut catalog = Self::new();
        for statement in ScriptParser::parse(sql)? {
            catalog.execute(statement)?;
        }
        Ok(catalog)
    }

    /// Read and apply a seed script file
    pub fn load_script(path: &Path) -> Result<Self> {
        let sql = fs::read_to_string(path).map_err(|e| {
            ReportError::Connection(format!("cannot read seed script {}: {}", path.display(), e))
        })?;
        let catalog = Self::from_script(&sql)?;
        info!(
            script = %path.display(),
            tables = catalog.tables.len(),
            "seed script loaded"
        );
        Ok(catalog)
    }

    /// Apply one seed statement
    pub fn execute(&mut self, statement: ScriptStatement) -> Result<()> {
        match statement {
            ScriptStatement::CreateTable { name, schema } => {
                let key = name.to_ascii_lowercase();
                if self.tables.contains_key(&key) {
                    return Err(ReportError::Query(format!("table '{}' already exists", name)));
                }
                self.tables.insert(key, Table::new(name, schema));
                Ok(())
            }

            ScriptStatement::Insert {
                table_name,
                columns,
                rows,
            } => {
                let table = self
                    .tables
                    .get_mut(&table_name.to_ascii_lowercase())
                    .ok_or_else(|| ReportError::Query(format!("no such table: {}", table_name)))?;

                let positions = Self::insert_positions(&table.schema, &table_name, &columns)?;
                for values in rows {
                    if values.len() != positions.len() {
                        return Err(ReportError::Query(format!(
                            "INSERT into '{}' expects {} values, got {}",
                            table_name,
                            positions.len(),
                            values.len()
                        )));
                    }

                    let mut row = vec![Value::Null; table.schema.columns.len()];
                    for (value, &position) in values.into_iter().zip(&positions) {
                        row[position] = table.schema.columns[position].data_type.coerce(value);
                    }
                    table.insert(row)?;
                }
                Ok(())
            }
        }
    }

    /// Schema position of each inserted value
    fn insert_positions(schema: &Schema, table_name: &str, columns: &[String]) -> Result<Vec<usize>> {
        if columns.is_empty() {
            return Ok((0..schema.columns.len()).collect());
        }
        columns
            .iter()
            .map(|name| {
                schema.get_column_index(name).ok_or_else(|| {
                    ReportError::Query(format!("table {} has no column named {}", table_name, name))
                })
            })
            .collect()
    }

    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables.get(&name.to_ascii_lowercase())
    }

    /// Table names, sorted
    pub fn list_tables(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.values().map(|t| t.name.clone()).collect();
        names.sort();
        names
    }
}

impl DataSource for MemoryCatalog {
    fn scan(&self, table_name: &str, columns: &[&str]) -> Result<Table> {
        let table = self
            .get_table(table_name)
            .ok_or_else(|| ReportError::DataAccess(format!("no such table: {}", table_name)))?;

        let indexes = columns
            .iter()
            .map(|name| {
                table.schema.get_column_index(name).ok_or_else(|| {
                    ReportError::DataAccess(format!("no such column: {}.{}", table_name, name))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        // Scanned columns keep the name the caller asked for
        let schema = Schema::new(
            columns
                .iter()
                .zip(&indexes)
                .map(|(name, &i)| Column::new(*name, table.schema.columns[i].data_type))
                .collect(),
        );
        let mut scanned = Table::new(table.name.clone(), schema);
        for row in &table.rows {
            scanned.insert(indexes.iter().map(|&i| row.values[i].clone()).collect())?;
        }

        debug!(table = table_name, rows = scanned.row_count(), "scanned in-memory table");
        Ok(scanned)
    }

    fn describe(&self) -> String {
        format!("in-memory catalog ({} tables)", self.tables.len())
    }
}
