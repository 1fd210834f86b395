// B-Tree key index
// Used as the lookup side of joins and as the bucket map for GROUP BY / DISTINCT

use super::{table::Table, DataType, Value};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Ordered composite key
/// Compares component-wise with `Value::sql_cmp`, so 3 and 3.0 are the same key
/// and NULLs group together
#[derive(Debug, Clone)]
pub struct IndexKey(pub Vec<Value>);

impl IndexKey {
    pub fn single(value: Value) -> Self {
        Self(vec![value])
    }
}

impl PartialEq for IndexKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for IndexKey {}

impl PartialOrd for IndexKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for IndexKey {
    fn cmp(&self, other: &Self) -> Ordering {
        for (a, b) in self.0.iter().zip(&other.0) {
            match a.sql_cmp(b) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        self.0.len().cmp(&other.0.len())
    }
}

/// Maps a column value to the ids of the rows holding it
#[derive(Debug, Clone, Default)]
pub struct BTreeIndex {
    tree: BTreeMap<IndexKey, Vec<usize>>,
}

impl BTreeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index one column of a table, keyed under `affinity` when one is given
    /// NULL values are left out: they can never satisfy an equi-join
    pub fn build(table: &Table, column: usize, affinity: Option<DataType>) -> Self {
        let mut index = Self::new();
        for (row_id, row) in table.rows.iter().enumerate() {
            let value = &row.values[column];
            if !value.is_null() {
                let key = match affinity {
                    Some(data_type) => data_type.coerce(value.clone()),
                    None => value.clone(),
                };
                index.insert(key, row_id);
            }
        }
        index
    }

    pub fn insert(&mut self, value: Value, row_id: usize) {
        self.tree
            .entry(IndexKey::single(value))
            .or_default()
            .push(row_id);
    }

    /// Row ids holding `value`, in insertion order
    pub fn lookup(&self, value: &Value) -> &[usize] {
        if value.is_null() {
            return &[];
        }
        self.tree
            .get(&IndexKey::single(value.clone()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
