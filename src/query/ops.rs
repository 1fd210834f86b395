// Row-level operators: filter, projection, ordering, limit, distinct

use crate::error::{ReportError, Result};
use crate::storage::btree::IndexKey;
use crate::storage::{table::Table, Column, DataType, Row, Schema, Value};
use std::collections::BTreeSet;

/// One output column of a projection
#[derive(Debug, Clone)]
pub enum Projection {
    /// `source AS alias`
    Column { source: String, alias: String },
    /// `COALESCE(source, fallback) AS alias`
    Coalesce {
        source: String,
        fallback: Value,
        alias: String,
    },
    /// `CAST(source AS REAL) AS alias`
    CastReal { source: String, alias: String },
}

impl Projection {
    pub fn column(source: &str, alias: &str) -> Self {
        Projection::Column {
            source: source.to_string(),
            alias: alias.to_string(),
        }
    }

    pub fn coalesce(source: &str, fallback: Value, alias: &str) -> Self {
        Projection::Coalesce {
            source: source.to_string(),
            fallback,
            alias: alias.to_string(),
        }
    }

    pub fn cast_real(source: &str, alias: &str) -> Self {
        Projection::CastReal {
            source: source.to_string(),
            alias: alias.to_string(),
        }
    }

    fn source(&self) -> &str {
        match self {
            Projection::Column { source, .. }
            | Projection::Coalesce { source, .. }
            | Projection::CastReal { source, .. } => source,
        }
    }

    fn alias(&self) -> &str {
        match self {
            Projection::Column { alias, .. }
            | Projection::Coalesce { alias, .. }
            | Projection::CastReal { alias, .. } => alias,
        }
    }

    fn output_type(&self, input: DataType) -> DataType {
        match self {
            Projection::Column { .. } => input,
            Projection::Coalesce { fallback, .. } => match (input, fallback) {
                (DataType::Text, Value::Text(_)) => DataType::Text,
                _ => DataType::Any,
            },
            Projection::CastReal { .. } => DataType::Float,
        }
    }

    fn evaluate(&self, value: &Value) -> Result<Value> {
        match self {
            Projection::Column { .. } => Ok(value.clone()),
            Projection::Coalesce { fallback, .. } => Ok(if value.is_null() {
                fallback.clone()
            } else {
                value.clone()
            }),
            Projection::CastReal { source, .. } => value
                .coerce_real()
                .map(|real| real.map_or(Value::Null, Value::Float))
                .map_err(|e| ReportError::DataAccess(format!("{} ({})", e, source))),
        }
    }
}

/// ORDER BY term
#[derive(Debug, Clone)]
pub struct SortKey {
    pub column: String,
    pub descending: bool,
}

impl SortKey {
    pub fn asc(column: &str) -> Self {
        Self {
            column: column.to_string(),
            descending: false,
        }
    }

    pub fn desc(column: &str) -> Self {
        Self {
            column: column.to_string(),
            descending: true,
        }
    }
}

impl Table {
    /// Keep rows for which `predicate` holds
    pub fn filter<F>(mut self, predicate: F) -> Table
    where
        F: Fn(&Row) -> bool,
    {
        self.rows.retain(|row| predicate(row));
        self
    }

    /// Keep rows whose value in `column` satisfies `predicate`
    pub fn filter_column<F>(self, column: &str, predicate: F) -> Result<Table>
    where
        F: Fn(&Value) -> bool,
    {
        let index = self.column_index(column)?;
        Ok(self.filter(|row| predicate(&row.values[index])))
    }

    /// SELECT list evaluation; output columns are named by alias
    pub fn project(self, projections: &[Projection]) -> Result<Table> {
        let indexes = projections
            .iter()
            .map(|p| self.column_index(p.source()))
            .collect::<Result<Vec<_>>>()?;

        let columns = projections
            .iter()
            .zip(&indexes)
            .map(|(p, &i)| Column::new(p.alias(), p.output_type(self.column(i).data_type)))
            .collect();

        let rows = self
            .rows
            .iter()
            .map(|row| {
                projections
                    .iter()
                    .zip(&indexes)
                    .map(|(p, &i)| p.evaluate(&row.values[i]))
                    .collect::<Result<Vec<_>>>()
                    .map(Row::new)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Table::from_rows(self.name, Schema::new(columns), rows))
    }

    /// Stable multi-key ORDER BY; rows that tie on every key keep their order
    pub fn sort_by(mut self, keys: &[SortKey]) -> Result<Table> {
        let resolved = keys
            .iter()
            .map(|k| -> Result<(usize, bool)> { Ok((self.column_index(&k.column)?, k.descending)) })
            .collect::<Result<Vec<_>>>()?;

        self.rows.sort_by(|a, b| {
            resolved
                .iter()
                .map(|&(i, descending)| {
                    let ord = a.values[i].sql_cmp(&b.values[i]);
                    if descending {
                        ord.reverse()
                    } else {
                        ord
                    }
                })
                .find(|ord| ord.is_ne())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(self)
    }

    pub fn limit(mut self, n: usize) -> Table {
        self.rows.truncate(n);
        self
    }

    /// SELECT DISTINCT: keep the first occurrence of each row
    pub fn distinct(mut self) -> Table {
        let mut seen = BTreeSet::new();
        self.rows
            .retain(|row| seen.insert(IndexKey(row.values.clone())));
        self
    }
}
