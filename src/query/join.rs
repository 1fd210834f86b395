// Join operators
// Equi-joins on a single key column, built as an index lookup on the right side

use crate::error::Result;
use crate::storage::{btree::BTreeIndex, table::Table, DataType, Row, Schema, Value};

/// How unmatched left rows are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// Emit one row per matching pair
    Inner,
    /// Like `Inner`, but an unmatched left row is kept once, padded with NULLs
    Left,
    /// Keep each left row that has at least one match, without right columns
    Semi,
}

impl Table {
    pub fn inner_join(self, right: &Table, left_key: &str, right_key: &str) -> Result<Table> {
        self.join(right, left_key, right_key, JoinKind::Inner)
    }

    pub fn left_join(self, right: &Table, left_key: &str, right_key: &str) -> Result<Table> {
        self.join(right, left_key, right_key, JoinKind::Left)
    }

    /// `left WHERE left_key IN (SELECT right_key FROM right)`
    pub fn semi_join(self, right: &Table, left_key: &str, right_key: &str) -> Result<Table> {
        self.join(right, left_key, right_key, JoinKind::Semi)
    }

    /// Join on `left_key = right_key`
    /// Output rows follow left row order, then right row order within a match;
    /// NULL keys never match. Keys are compared under the declared types'
    /// comparison affinity, so INTEGER 1056 matches TEXT '1056'.
    pub fn join(
        self,
        right: &Table,
        left_key: &str,
        right_key: &str,
        kind: JoinKind,
    ) -> Result<Table> {
        let left_index = self.column_index(left_key)?;
        let right_index = right.column_index(right_key)?;
        let (left_affinity, right_affinity) = DataType::comparison_affinity(
            self.column(left_index).data_type,
            right.column(right_index).data_type,
        );
        let index = BTreeIndex::build(right, right_index, right_affinity);

        let name = format!("{} ⋈ {}", self.name, right.name);
        let mut columns = self.schema.columns;
        if kind != JoinKind::Semi {
            columns.extend(right.schema.columns.iter().cloned());
        }
        let right_width = right.schema.columns.len();

        let mut rows = Vec::with_capacity(self.rows.len());
        for row in self.rows {
            let key = &row.values[left_index];
            let matches = match left_affinity {
                Some(data_type) => index.lookup(&data_type.coerce(key.clone())),
                None => index.lookup(key),
            };
            match kind {
                JoinKind::Semi => {
                    if !matches.is_empty() {
                        rows.push(row);
                    }
                }
                JoinKind::Left if matches.is_empty() => {
                    let mut values = row.values;
                    values.extend(std::iter::repeat(Value::Null).take(right_width));
                    rows.push(Row::new(values));
                }
                JoinKind::Inner | JoinKind::Left => {
                    for &right_row in matches {
                        let mut values = row.values.clone();
                        values.extend(right.rows[right_row].values.iter().cloned());
                        rows.push(Row::new(values));
                    }
                }
            }
        }

        Ok(Table::from_rows(name, Schema::new(columns), rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Column, DataType};

    fn table(name: &str, columns: &[&str], rows: Vec<Vec<Value>>) -> Table {
        let schema = Schema::new(
            columns
                .iter()
                .map(|c| Column::new(*c, DataType::Any))
                .collect(),
        );
        Table::from_rows(name, schema, rows.into_iter().map(Row::new).collect()).qualify(name)
    }

    fn offices() -> Table {
        table(
            "o",
            &["officeCode", "city"],
            vec![
                vec![Value::text("1"), Value::text("Boston")],
                vec![Value::text("4"), Value::text("Tokyo")],
            ],
        )
    }

    fn employees() -> Table {
        table(
            "e",
            &["employeeNumber", "officeCode"],
            vec![
                vec![Value::Integer(1002), Value::text("1")],
                vec![Value::Integer(1056), Value::text("1")],
                vec![Value::Integer(1200), Value::Null],
            ],
        )
    }

    #[test]
    fn test_inner_join_drops_unmatched() {
        let joined = employees().inner_join(&offices(), "e.officeCode", "o.officeCode").unwrap();
        assert_eq!(joined.row_count(), 2);
        assert_eq!(
            joined.column_names(),
            vec!["e.employeeNumber", "e.officeCode", "o.officeCode", "o.city"]
        );
        assert_eq!(joined.rows[0].values[3], Value::text("Boston"));
    }

    #[test]
    fn test_left_join_keeps_every_left_row() {
        let joined = offices().left_join(&employees(), "o.officeCode", "e.officeCode").unwrap();
        // Boston matches twice, Tokyo is padded once
        assert_eq!(joined.row_count(), 3);
        let tokyo = &joined.rows[2];
        assert_eq!(tokyo.values[1], Value::text("Tokyo"));
        assert_eq!(tokyo.values[2], Value::Null);
        assert_eq!(tokyo.values[3], Value::Null);
    }

    #[test]
    fn test_null_keys_never_match() {
        let joined = employees().left_join(&offices(), "e.officeCode", "o.officeCode").unwrap();
        let anna = &joined.rows[2];
        assert_eq!(anna.values[0], Value::Integer(1200));
        assert_eq!(anna.values[2], Value::Null);
    }

    #[test]
    fn test_semi_join_does_not_duplicate() {
        let with_staff = offices().semi_join(&employees(), "o.officeCode", "e.officeCode").unwrap();
        assert_eq!(with_staff.row_count(), 1);
        assert_eq!(with_staff.column_names(), vec!["o.officeCode", "o.city"]);
    }

    #[test]
    fn test_join_applies_numeric_affinity_to_untyped_keys() {
        let reps = Table::from_rows(
            "e",
            Schema::new(vec![
                Column::new("employeeNumber", DataType::Integer),
                Column::new("lastName", DataType::Text),
            ]),
            vec![Row::new(vec![Value::Integer(1056), Value::text("Patterson")])],
        )
        .qualify("e");
        let customers = Table::from_rows(
            "c",
            Schema::new(vec![
                Column::new("customerNumber", DataType::Integer),
                Column::new("salesRepEmployeeNumber", DataType::Text),
            ]),
            vec![
                Row::new(vec![Value::Integer(101), Value::text("1056")]),
                Row::new(vec![Value::Integer(102), Value::text("1056.0")]),
                Row::new(vec![Value::Integer(103), Value::text("n/a")]),
            ],
        )
        .qualify("c");

        let joined = reps
            .clone()
            .inner_join(&customers, "e.employeeNumber", "c.salesRepEmployeeNumber")
            .unwrap();
        assert_eq!(joined.row_count(), 2);
        // Stored values are left as they were
        assert_eq!(joined.rows[0].values[3], Value::text("1056"));

        let reversed = customers
            .inner_join(&reps, "c.salesRepEmployeeNumber", "e.employeeNumber")
            .unwrap();
        assert_eq!(reversed.row_count(), 2);
    }
}
