// Table implementation
// A table is a named schema plus its rows, materialized in memory

use super::{Column, Row, Schema, Value};
use crate::error::{ReportError, Result};

/// A materialized relation: a scanned base table or the output of an operator
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// The name of the table (or a description of how it was derived)
    pub name: String,
    /// The schema (column definitions)
    pub schema: Schema,
    /// Rows in their current order
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
            rows: Vec::new(),
        }
    }

    pub fn from_rows(name: impl Into<String>, schema: Schema, rows: Vec<Row>) -> Self {
        Self {
            name: name.into(),
            schema,
            rows,
        }
    }

    /// Append a row, checking it matches the schema width
    pub fn insert(&mut self, values: Vec<Value>) -> Result<()> {
        if values.len() != self.schema.columns.len() {
            return Err(ReportError::Query(format!(
                "table '{}' expects {} values, got {}",
                self.name,
                self.schema.columns.len(),
                values.len()
            )));
        }

        self.rows.push(Row { values });
        Ok(())
    }

    /// Prefix every column with `alias.`, replacing any existing qualifier
    pub fn qualify(mut self, alias: &str) -> Self {
        for column in &mut self.schema.columns {
            let base = match column.name.rsplit_once('.') {
                Some((_, base)) => base.to_string(),
                None => column.name.clone(),
            };
            column.name = format!("{}.{}", alias, base);
        }
        self
    }

    /// Resolve a column reference
    /// Accepts the exact name, or an unqualified name that matches exactly one
    /// qualified column
    pub fn column_index(&self, name: &str) -> Result<usize> {
        if let Some(index) = self.schema.get_column_index(name) {
            return Ok(index);
        }

        if !name.contains('.') {
            let matches: Vec<usize> = self
                .schema
                .columns
                .iter()
                .enumerate()
                .filter(|(_, col)| {
                    col.name
                        .rsplit_once('.')
                        .is_some_and(|(_, base)| base.eq_ignore_ascii_case(name))
                })
                .map(|(i, _)| i)
                .collect();

            match matches.as_slice() {
                [index] => return Ok(*index),
                [] => {}
                _ => {
                    return Err(ReportError::Query(format!(
                        "ambiguous column '{}' in '{}'",
                        name, self.name
                    )))
                }
            }
        }

        Err(ReportError::Query(format!(
            "no column '{}' in '{}' (columns: {})",
            name,
            self.name,
            self.schema.column_names().join(", ")
        )))
    }

    pub fn column(&self, index: usize) -> &Column {
        &self.schema.columns[index]
    }

    /// All values of one column, in row order
    pub fn column_values(&self, name: &str) -> Result<Vec<&Value>> {
        let index = self.column_index(name)?;
        Ok(self.rows.iter().map(|row| &row.values[index]).collect())
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.schema.column_names()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::DataType;

    fn offices() -> Table {
        let schema = Schema::new(vec![
            Column::new("officeCode", DataType::Text),
            Column::new("city", DataType::Text),
        ]);
        let mut table = Table::new("offices", schema);
        table.insert(vec![Value::text("1"), Value::text("Boston")]).unwrap();
        table
    }

    #[test]
    fn test_insert_checks_width() {
        let mut table = offices();
        let err = table.insert(vec![Value::text("2")]).unwrap_err();
        assert!(matches!(err, ReportError::Query(_)));
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn test_qualify_and_resolve() {
        let table = offices().qualify("o");
        assert_eq!(table.column_names(), vec!["o.officeCode", "o.city"]);
        assert_eq!(table.column_index("o.city").unwrap(), 1);
        assert_eq!(table.column_index("CITY").unwrap(), 1);

        let requalified = table.qualify("x");
        assert_eq!(requalified.column_names(), vec!["x.officeCode", "x.city"]);
    }

    #[test]
    fn test_missing_and_ambiguous_columns() {
        let table = offices().qualify("o");
        assert!(matches!(
            table.column_index("state"),
            Err(ReportError::Query(_))
        ));

        let mut schema = table.schema.clone();
        schema.columns.push(Column::new("e.city", DataType::Text));
        let joined = Table::new("joined", schema);
        let err = joined.column_index("city").unwrap_err();
        assert!(err.to_string().contains("ambiguous"));
        assert_eq!(joined.column_index("e.city").unwrap(), 2);
    }
}
