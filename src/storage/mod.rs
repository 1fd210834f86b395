// Storage module - in-memory relations
// Every scan, join and aggregate produces a Table of Rows made of Values

pub mod btree;
pub mod table;

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Represents a single row in a table
/// Serialized as a plain array of values
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Row {
    pub values: Vec<Value>,
}

impl Row {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }
}

/// A single stored or computed value
/// Mirrors the SQLite storage classes, plus booleans from seed scripts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
    Boolean(bool),
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of the value, if it is stored as a number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Null | Value::Text(_) => None,
        }
    }

    /// Coerce to a real number, parsing text when needed
    /// NULL stays NULL; text that is not a number is an error
    pub fn coerce_real(&self) -> Result<Option<f64>, String> {
        match self {
            Value::Null => Ok(None),
            Value::Text(s) => s
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|_| format!("cannot convert '{}' to a real number", s)),
            other => Ok(other.as_f64()),
        }
    }

    /// Total order used for sorting, grouping and join keys
    /// NULL sorts first, then numbers (compared numerically), then text
    pub fn sql_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a.total_cmp(&b),
                _ => self.class_rank().cmp(&other.class_rank()),
            },
        }
    }

    /// SQL equality: NULL never equals anything, including NULL
    pub fn sql_eq(&self, other: &Value) -> bool {
        !self.is_null() && !other.is_null() && self.sql_cmp(other) == Ordering::Equal
    }

    fn class_rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Integer(_) | Value::Float(_) | Value::Boolean(_) => 1,
            Value::Text(_) => 2,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Integer(i) => write!(f, "{}", i),
            // Keep a trailing ".0" so reals stay distinguishable from integers
            Value::Float(x) if x.is_finite() && x.fract() == 0.0 => write!(f, "{:.1}", x),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => write!(f, "{}", s),
            Value::Boolean(b) => write!(f, "{}", b),
        }
    }
}

/// Represents the schema (structure) of a table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Schema {
    pub columns: Vec<Column>,
}

/// Represents a single column definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Column {
    pub name: String,
    pub data_type: DataType,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// Declared column types
/// `Any` is used when the source declares none (untyped or BLOB columns)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DataType {
    Integer,
    Float,
    Text,
    Boolean,
    Any,
}

impl DataType {
    /// Affinity of an SQLite declared type, by SQLite's substring rules
    pub fn from_declared(declared: &str) -> Self {
        let declared = declared.to_ascii_uppercase();
        if declared.contains("INT") {
            DataType::Integer
        } else if ["CHAR", "CLOB", "TEXT"].iter().any(|t| declared.contains(t)) {
            DataType::Text
        } else if declared.is_empty() || declared.contains("BLOB") {
            DataType::Any
        } else {
            // REAL, FLOAT, DOUBLE, NUMERIC and BOOLEAN all compare as numbers
            DataType::Float
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Integer | DataType::Float)
    }

    /// Affinity applied to each side of `left = right` before comparing
    ///
    /// A numeric column makes the other side compare as a number unless it is
    /// numeric too; a text column does the same for an untyped side.
    pub fn comparison_affinity(left: DataType, right: DataType) -> (Option<DataType>, Option<DataType>) {
        match (left, right) {
            (l, r) if l.is_numeric() && !r.is_numeric() => (None, Some(DataType::Float)),
            (l, r) if !l.is_numeric() && r.is_numeric() => (Some(DataType::Float), None),
            (DataType::Text, DataType::Any) => (None, Some(DataType::Text)),
            (DataType::Any, DataType::Text) => (Some(DataType::Text), None),
            _ => (None, None),
        }
    }

    /// Apply this type's affinity to a value, the way SQLite does on insert
    pub fn coerce(&self, value: Value) -> Value {
        match (self, value) {
            (DataType::Integer, Value::Float(f)) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                Value::Integer(f as i64)
            }
            (DataType::Integer, Value::Text(s)) => match s.trim().parse::<i64>() {
                Ok(i) => Value::Integer(i),
                Err(_) => Value::Text(s),
            },
            (DataType::Float, Value::Integer(i)) => Value::Float(i as f64),
            (DataType::Float, Value::Text(s)) => match s.trim().parse::<f64>() {
                Ok(f) => Value::Float(f),
                Err(_) => Value::Text(s),
            },
            (DataType::Text, v @ (Value::Integer(_) | Value::Float(_))) => Value::Text(v.to_string()),
            (_, v) => v,
        }
    }
}

impl Schema {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    /// Find the index of a column by name (case-insensitive, like SQLite)
    pub fn get_column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|col| col.name.eq_ignore_ascii_case(name))
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}
