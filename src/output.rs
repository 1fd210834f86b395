// Output rendering
// Turns a report table into text: a boxed table, CSV or JSON

use crate::error::Result;
use crate::storage::{table::Table, Row};
use clap::ValueEnum;
use serde::Serialize;

/// Supported renderings of a report table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Boxed text table, for terminals
    #[default]
    Table,
    /// RFC 4180 CSV with a header row
    Csv,
    /// JSON object with the column names and an array of row arrays
    Json,
}

impl OutputFormat {
    /// File extension used when writing one file per report
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Table => "txt",
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

#[derive(Serialize)]
struct JsonTable<'a> {
    report: &'a str,
    columns: Vec<&'a str>,
    rows: &'a [Row],
}

/// Render `table` in the requested format
pub fn render(table: &Table, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(format_table(table)),
        OutputFormat::Csv => format_csv(table),
        OutputFormat::Json => {
            let json = JsonTable {
                report: &table.name,
                columns: table.column_names(),
                rows: &table.rows,
            };
            Ok(serde_json::to_string_pretty(&json)? + "\n")
        }
    }
}

fn format_csv(table: &Table) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(table.column_names())?;
    for row in &table.rows {
        writer.write_record(row.values.iter().map(csv_field))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    String::from_utf8(bytes)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e).into())
}

/// NULL becomes an empty field
fn csv_field(value: &crate::storage::Value) -> String {
    if value.is_null() {
        String::new()
    } else {
        value.to_string()
    }
}

/// Boxed table with a header, one line per row and a row count
pub fn format_table(table: &Table) -> String {
    let column_names = table.column_names();
    let cells: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| row.values.iter().map(|v| v.to_string()).collect())
        .collect();

    let mut widths: Vec<usize> = column_names.iter().map(|c| c.chars().count()).collect();
    for row in &cells {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let mut result = String::new();
    result.push_str(&border(&widths, '┌', '┬', '┐'));

    result.push('│');
    for (name, width) in column_names.iter().zip(&widths) {
        result.push_str(&format!(" {:<width$} │", name, width = width));
    }
    result.push('\n');

    result.push_str(&border(&widths, '├', '┼', '┤'));

    for row in &cells {
        result.push('│');
        for (cell, width) in row.iter().zip(&widths) {
            result.push_str(&format!(" {:<width$} │", cell, width = width));
        }
        result.push('\n');
    }

    result.push_str(&border(&widths, '└', '┴', '┘'));
    result.push_str(&format!("{} row(s)\n", table.row_count()));
    result
}

fn border(widths: &[usize], left: char, middle: char, right: char) -> String {
    let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
    format!("{}{}{}\n", left, segments.join(&middle.to_string()), right)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Column, DataType, Schema, Value};

    fn sample() -> Table {
        let schema = Schema::new(vec![
            Column::new("officeCode", DataType::Text),
            Column::new("n_customers", DataType::Integer),
            Column::new("state", DataType::Text),
        ]);
        Table::from_rows(
            "customers-per-office",
            schema,
            vec![
                Row::new(vec![Value::text("1"), Value::Integer(12), Value::text("MA")]),
                Row::new(vec![Value::text("4"), Value::Integer(0), Value::Null]),
            ],
        )
    }

    #[test]
    fn test_format_table() {
        let text = format_table(&sample());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "┌────────────┬─────────────┬───────┐");
        assert_eq!(lines[1], "│ officeCode │ n_customers │ state │");
        assert_eq!(lines[3], "│ 1          │ 12          │ MA    │");
        assert_eq!(lines[4], "│ 4          │ 0           │ NULL  │");
        assert_eq!(lines[6], "2 row(s)");
    }

    #[test]
    fn test_format_empty_table_keeps_header() {
        let mut table = sample();
        table.rows.clear();
        let text = format_table(&table);
        assert!(text.contains("officeCode"));
        assert!(text.ends_with("0 row(s)\n"));
    }

    #[test]
    fn test_render_csv() {
        let csv = render(&sample(), OutputFormat::Csv).unwrap();
        assert_eq!(csv, "officeCode,n_customers,state\n1,12,MA\n4,0,\n");
    }

    #[test]
    fn test_render_csv_keeps_non_ascii_text() {
        let mut table = sample();
        table.rows[0].values[2] = Value::text("Île-de-France, \"IDF\"");
        let csv = render(&table, OutputFormat::Csv).unwrap();
        assert_eq!(
            csv,
            "officeCode,n_customers,state\n1,12,\"Île-de-France, \"\"IDF\"\"\"\n4,0,\n"
        );
    }

    #[test]
    fn test_render_json() {
        let json = render(&sample(), OutputFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["report"], "customers-per-office");
        assert_eq!(parsed["columns"][1], "n_customers");
        assert_eq!(parsed["rows"][0], serde_json::json!(["1", 12, "MA"]));
        assert_eq!(parsed["rows"][1][2], serde_json::Value::Null);
    }
}
