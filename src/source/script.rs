// Seed script parser
// Converts CREATE TABLE / INSERT scripts into statements the memory catalog can apply
// We use the sqlparser crate to handle the SQL grammar

use crate::error::{ReportError, Result};
use crate::storage::{Column, DataType, Schema, Value};
use sqlparser::ast::{
    CreateTable, DataType as SqlDataType, Expr, Insert, ObjectName, SetExpr, Statement,
    UnaryOperator, Value as SqlValue,
};
use sqlparser::dialect::SQLiteDialect;
use sqlparser::parser::Parser;

/// The statements a seed script may contain
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptStatement {
    /// CREATE TABLE tablename (col1 TYPE, col2 TYPE, ...)
    CreateTable { name: String, schema: Schema },
    /// INSERT INTO tablename [(cols)] VALUES (...), (...)
    Insert {
        table_name: String,
        /// Empty when the statement lists no columns
        columns: Vec<String>,
        rows: Vec<Vec<Value>>,
    },
}

/// The seed script parser
pub struct ScriptParser;

impl ScriptParser {
    /// Parse every statement of a script
    pub fn parse(sql: &str) -> Result<Vec<ScriptStatement>> {
        let dialect = SQLiteDialect {};
        let ast = Parser::parse_sql(&dialect, sql)
            .map_err(|e| ReportError::Query(format!("SQL parsing error: {}", e)))?;

        ast.iter().map(Self::parse_statement).collect()
    }

    fn parse_statement(statement: &Statement) -> Result<ScriptStatement> {
        match statement {
            Statement::CreateTable(create_table) => Self::parse_create_table(create_table),
            Statement::Insert(insert) => Self::parse_insert(insert),
            other => Err(ReportError::Query(format!(
                "unsupported statement in seed script: {}",
                other
            ))),
        }
    }

    fn parse_create_table(create_table: &CreateTable) -> Result<ScriptStatement> {
        let name = Self::object_name(&create_table.name);
        if create_table.columns.is_empty() {
            return Err(ReportError::Query(format!("table '{}' has no columns", name)));
        }

        let columns = create_table
            .columns
            .iter()
            .map(|column_def| {
                Column::new(
                    column_def.name.value.clone(),
                    Self::parse_data_type(&column_def.data_type),
                )
            })
            .collect();

        Ok(ScriptStatement::CreateTable {
            name,
            schema: Schema::new(columns),
        })
    }

    fn parse_insert(insert: &Insert) -> Result<ScriptStatement> {
        let table_name = Self::object_name(&insert.table_name);
        let columns = insert.columns.iter().map(|c| c.value.clone()).collect();

        let source = insert
            .source
            .as_ref()
            .ok_or_else(|| ReportError::Query(format!("INSERT into '{}' has no values", table_name)))?;

        let rows = match source.body.as_ref() {
            SetExpr::Values(values) => values
                .rows
                .iter()
                .map(|row| Self::parse_values(row))
                .collect::<Result<Vec<_>>>()?,
            _ => {
                return Err(ReportError::Query(format!(
                    "INSERT into '{}' must use a VALUES list",
                    table_name
                )))
            }
        };

        Ok(ScriptStatement::Insert {
            table_name,
            columns,
            rows,
        })
    }

    /// Declared type to affinity; anything unrecognized stays untyped
    fn parse_data_type(sql_type: &SqlDataType) -> DataType {
        match sql_type {
            SqlDataType::Int(_)
            | SqlDataType::Integer(_)
            | SqlDataType::BigInt(_)
            | SqlDataType::SmallInt(_) => DataType::Integer,
            SqlDataType::Float(_)
            | SqlDataType::Double
            | SqlDataType::DoublePrecision
            | SqlDataType::Real
            | SqlDataType::Decimal(_)
            | SqlDataType::Numeric(_) => DataType::Float,
            SqlDataType::Text
            | SqlDataType::Varchar(_)
            | SqlDataType::Char(_)
            | SqlDataType::String(_)
            | SqlDataType::Date => DataType::Text,
            SqlDataType::Boolean => DataType::Boolean,
            _ => DataType::Any,
        }
    }

    fn parse_values(exprs: &[Expr]) -> Result<Vec<Value>> {
        exprs.iter().map(Self::parse_value).collect()
    }

    fn parse_value(expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Value(SqlValue::Number(n, _)) => Self::parse_number(n),
            Expr::Value(SqlValue::SingleQuotedString(s)) => Ok(Value::Text(s.clone())),
            Expr::Value(SqlValue::Boolean(b)) => Ok(Value::Boolean(*b)),
            Expr::Value(SqlValue::Null) => Ok(Value::Null),
            Expr::UnaryOp {
                op: UnaryOperator::Minus,
                expr,
            } => match Self::parse_value(expr)? {
                Value::Integer(i) => Ok(Value::Integer(-i)),
                Value::Float(f) => Ok(Value::Float(-f)),
                other => Err(ReportError::Query(format!("cannot negate {}", other))),
            },
            Expr::UnaryOp {
                op: UnaryOperator::Plus,
                expr,
            } => Self::parse_value(expr),
            Expr::Nested(inner) => Self::parse_value(inner),
            _ => Err(ReportError::Query(format!(
                "unsupported value expression: {}",
                expr
            ))),
        }
    }

    fn parse_number(literal: &str) -> Result<Value> {
        let is_integral = !literal.contains(['.', 'e', 'E']);
        if is_integral {
            if let Ok(i) = literal.parse::<i64>() {
                return Ok(Value::Integer(i));
            }
        }
        literal
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| ReportError::Query(format!("invalid number literal: {}", literal)))
    }

    fn object_name(name: &ObjectName) -> String {
        name.0
            .iter()
            .map(|i| i.value.clone())
            .collect::<Vec<_>>()
            .join(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_create_and_insert() {
        let statements = ScriptParser::parse(
            "CREATE TABLE payments (customerName TEXT, checkNumber VARCHAR(50), amount REAL, note BLOB);
             INSERT INTO payments VALUES ('Atelier', 'HQ336336', 6066.78, NULL), ('Signal', 'JM555205', -14571, 'x');",
        )
        .unwrap();

        assert_eq!(statements.len(), 2);
        match &statements[0] {
            ScriptStatement::CreateTable { name, schema } => {
                assert_eq!(name, "payments");
                let types: Vec<DataType> = schema.columns.iter().map(|c| c.data_type).collect();
                assert_eq!(
                    types,
                    vec![DataType::Text, DataType::Text, DataType::Float, DataType::Any]
                );
            }
            other => panic!("expected CREATE TABLE, got {:?}", other),
        }
        match &statements[1] {
            ScriptStatement::Insert { rows, columns, .. } => {
                assert!(columns.is_empty());
                assert_eq!(rows.len(), 2);
                assert_eq!(rows[0][2], Value::Float(6066.78));
                assert_eq!(rows[0][3], Value::Null);
                assert_eq!(rows[1][2], Value::Integer(-14571));
            }
            other => panic!("expected INSERT, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_insert_with_column_list() {
        let statements =
            ScriptParser::parse("INSERT INTO offices (officeCode, city) VALUES ('1', 'Boston')")
                .unwrap();
        assert_eq!(
            statements[0],
            ScriptStatement::Insert {
                table_name: "offices".to_string(),
                columns: vec!["officeCode".to_string(), "city".to_string()],
                rows: vec![vec![Value::text("1"), Value::text("Boston")]],
            }
        );
    }

    #[test]
    fn test_rejects_other_statements() {
        let err = ScriptParser::parse("DELETE FROM offices WHERE officeCode = '1'").unwrap_err();
        assert!(matches!(err, ReportError::Query(_)));

        let err = ScriptParser::parse("SELEC * FROM offices").unwrap_err();
        assert!(err.to_string().contains("SQL parsing error"));
    }
}
