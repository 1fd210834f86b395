// Grouping and aggregate functions

use crate::error::{ReportError, Result};
use crate::storage::btree::IndexKey;
use crate::storage::{table::Table, Column, DataType, Row, Schema, Value};
use std::collections::{BTreeMap, BTreeSet};

/// Aggregate functions; all of them ignore NULL inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFn {
    Count,
    CountDistinct,
    Sum,
    Avg,
}

/// One aggregate output column: `func(column) AS alias`
#[derive(Debug, Clone)]
pub struct Aggregate {
    pub func: AggregateFn,
    pub column: String,
    pub alias: String,
}

impl Aggregate {
    pub fn new(func: AggregateFn, column: &str, alias: &str) -> Self {
        Self {
            func,
            column: column.to_string(),
            alias: alias.to_string(),
        }
    }

    pub fn count(column: &str, alias: &str) -> Self {
        Self::new(AggregateFn::Count, column, alias)
    }

    pub fn count_distinct(column: &str, alias: &str) -> Self {
        Self::new(AggregateFn::CountDistinct, column, alias)
    }

    pub fn sum(column: &str, alias: &str) -> Self {
        Self::new(AggregateFn::Sum, column, alias)
    }

    pub fn avg(column: &str, alias: &str) -> Self {
        Self::new(AggregateFn::Avg, column, alias)
    }

    fn output_type(&self, input: DataType) -> DataType {
        match self.func {
            AggregateFn::Count | AggregateFn::CountDistinct => DataType::Integer,
            AggregateFn::Avg => DataType::Float,
            AggregateFn::Sum => match input {
                DataType::Integer | DataType::Boolean => DataType::Integer,
                DataType::Float => DataType::Float,
                DataType::Text | DataType::Any => DataType::Any,
            },
        }
    }

    fn evaluate<'a>(&self, values: impl Iterator<Item = &'a Value>) -> Result<Value> {
        let values = values.filter(|v| !v.is_null());
        match self.func {
            AggregateFn::Count => Ok(Value::Integer(values.count() as i64)),
            AggregateFn::CountDistinct => {
                let distinct: BTreeSet<IndexKey> =
                    values.map(|v| IndexKey::single(v.clone())).collect();
                Ok(Value::Integer(distinct.len() as i64))
            }
            AggregateFn::Sum => self.sum_values(values),
            AggregateFn::Avg => {
                let mut total = 0.0;
                let mut count = 0usize;
                for value in values {
                    total += self.numeric(value)?;
                    count += 1;
                }
                if count == 0 {
                    Ok(Value::Null)
                } else {
                    Ok(Value::Float(total / count as f64))
                }
            }
        }
    }

    /// Integer while every input is an integer, real as soon as one is not
    fn sum_values<'a>(&self, values: impl Iterator<Item = &'a Value>) -> Result<Value> {
        let mut int_total: Option<i64> = Some(0);
        let mut real_total = 0.0;
        let mut seen = false;

        for value in values {
            seen = true;
            real_total += self.numeric(value)?;
            int_total = match (int_total, value) {
                (Some(acc), Value::Integer(i)) => Some(acc.checked_add(*i).ok_or_else(|| {
                    ReportError::DataAccess(format!("integer overflow in SUM({})", self.column))
                })?),
                _ => None,
            };
        }

        Ok(match (seen, int_total) {
            (false, _) => Value::Null,
            (true, Some(total)) => Value::Integer(total),
            (true, None) => Value::Float(real_total),
        })
    }

    fn numeric(&self, value: &Value) -> Result<f64> {
        value
            .coerce_real()
            .map_err(|e| ReportError::DataAccess(format!("{} in {}({})", e, self.func_name(), self.column)))?
            .ok_or_else(|| ReportError::DataAccess(format!("unexpected NULL in {}", self.alias)))
    }

    fn func_name(&self) -> &'static str {
        match self.func {
            AggregateFn::Count => "COUNT",
            AggregateFn::CountDistinct => "COUNT DISTINCT",
            AggregateFn::Sum => "SUM",
            AggregateFn::Avg => "AVG",
        }
    }
}

impl Table {
    /// GROUP BY `keys`
    ///
    /// Output columns are the key columns, then `carried` columns (bare columns
    /// taking their value from the first row of each group), then one column per
    /// aggregate. Groups come out in ascending key order.
    pub fn group_by(self, keys: &[&str], carried: &[&str], aggregates: &[Aggregate]) -> Result<Table> {
        let key_indexes = keys
            .iter()
            .map(|k| self.column_index(k))
            .collect::<Result<Vec<_>>>()?;
        let carried_indexes = carried
            .iter()
            .map(|c| self.column_index(c))
            .collect::<Result<Vec<_>>>()?;
        let aggregate_indexes = aggregates
            .iter()
            .map(|a| self.column_index(&a.column))
            .collect::<Result<Vec<_>>>()?;

        let mut columns: Vec<Column> = key_indexes
            .iter()
            .chain(&carried_indexes)
            .map(|&i| self.column(i).clone())
            .collect();
        for (aggregate, &i) in aggregates.iter().zip(&aggregate_indexes) {
            columns.push(Column::new(
                aggregate.alias.clone(),
                aggregate.output_type(self.column(i).data_type),
            ));
        }

        let mut groups: BTreeMap<IndexKey, Vec<usize>> = BTreeMap::new();
        for (row_id, row) in self.rows.iter().enumerate() {
            let key = IndexKey(key_indexes.iter().map(|&i| row.values[i].clone()).collect());
            groups.entry(key).or_default().push(row_id);
        }

        let mut rows = Vec::with_capacity(groups.len());
        for (key, members) in groups {
            let first = &self.rows[members[0]];
            let mut values = key.0;
            values.extend(carried_indexes.iter().map(|&i| first.values[i].clone()));
            for (aggregate, &i) in aggregates.iter().zip(&aggregate_indexes) {
                let inputs = members.iter().map(|&row_id| &self.rows[row_id].values[i]);
                values.push(aggregate.evaluate(inputs)?);
            }
            rows.push(Row::new(values));
        }

        Ok(Table::from_rows(
            format!("{} grouped", self.name),
            Schema::new(columns),
            rows,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines() -> Table {
        let schema = Schema::new(vec![
            Column::new("od.productCode", DataType::Text),
            Column::new("od.orderNumber", DataType::Integer),
            Column::new("od.quantityOrdered", DataType::Integer),
            Column::new("o.customerNumber", DataType::Integer),
        ]);
        let rows = vec![
            vec![Value::text("S10"), Value::Integer(1), Value::Integer(30), Value::Integer(101)],
            vec![Value::text("S12"), Value::Integer(1), Value::Integer(5), Value::Integer(101)],
            vec![Value::text("S10"), Value::Integer(2), Value::Integer(20), Value::Integer(101)],
            vec![Value::text("S10"), Value::Integer(3), Value::Null, Value::Integer(102)],
        ];
        Table::from_rows("lines", schema, rows.into_iter().map(Row::new).collect())
    }

    #[test]
    fn test_count_sum_and_distinct() {
        let grouped = lines()
            .group_by(
                &["od.productCode"],
                &[],
                &[
                    Aggregate::count("od.orderNumber", "numorders"),
                    Aggregate::sum("od.quantityOrdered", "totalunits"),
                    Aggregate::count_distinct("o.customerNumber", "numpurchasers"),
                ],
            )
            .unwrap();

        assert_eq!(
            grouped.column_names(),
            vec!["od.productCode", "numorders", "totalunits", "numpurchasers"]
        );
        assert_eq!(
            grouped.rows[0].values,
            vec![Value::text("S10"), Value::Integer(3), Value::Integer(50), Value::Integer(2)]
        );
        assert_eq!(
            grouped.rows[1].values,
            vec![Value::text("S12"), Value::Integer(1), Value::Integer(5), Value::Integer(1)]
        );
    }

    #[test]
    fn test_avg_and_empty_groups() {
        let schema = Schema::new(vec![
            Column::new("office", DataType::Text),
            Column::new("credit", DataType::Float),
        ]);
        let rows = vec![
            vec![Value::text("1"), Value::Float(100000.0)],
            vec![Value::text("1"), Value::Integer(80000)],
            vec![Value::text("2"), Value::Null],
        ];
        let table = Table::from_rows("c", schema, rows.into_iter().map(Row::new).collect());
        let grouped = table
            .group_by(
                &["office"],
                &[],
                &[
                    Aggregate::avg("credit", "avg_credit"),
                    Aggregate::sum("credit", "total"),
                    Aggregate::count("credit", "n"),
                ],
            )
            .unwrap();

        assert_eq!(grouped.rows[0].values[1], Value::Float(90000.0));
        assert_eq!(grouped.rows[0].values[2], Value::Float(180000.0));
        assert_eq!(grouped.rows[1].values[1], Value::Null);
        assert_eq!(grouped.rows[1].values[2], Value::Null);
        assert_eq!(grouped.rows[1].values[3], Value::Integer(0));
    }

    #[test]
    fn test_non_numeric_input_is_data_access_error() {
        let schema = Schema::new(vec![
            Column::new("k", DataType::Integer),
            Column::new("v", DataType::Text),
        ]);
        let table = Table::from_rows(
            "t",
            schema,
            vec![Row::new(vec![Value::Integer(1), Value::text("lots")])],
        );
        let err = table
            .group_by(&["k"], &[], &[Aggregate::avg("v", "avg_v")])
            .unwrap_err();
        assert!(matches!(err, ReportError::DataAccess(_)));
    }

    #[test]
    fn test_carried_columns_take_first_row() {
        let grouped = lines()
            .group_by(&["o.customerNumber"], &["od.productCode"], &[])
            .unwrap();
        assert_eq!(grouped.row_count(), 2);
        assert_eq!(grouped.rows[0].values, vec![Value::Integer(101), Value::text("S10")]);
    }
}
