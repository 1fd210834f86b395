// Example: Run the whole report catalog against the bundled seed data
// Run with: cargo run --example run_reports

use sales_reports::output::format_table;
use sales_reports::{FailurePolicy, MemoryCatalog, ReportId, ReportRunner};

fn main() -> anyhow::Result<()> {
    println!("=== Sales Reports Demo ===\n");

    let catalog = MemoryCatalog::from_script(include_str!("../tests/fixtures/sales.sql"))?;
    println!("Loaded tables: {}\n", catalog.list_tables().join(", "));

    let summary = ReportRunner::new(&catalog, FailurePolicy::Continue).run(&ReportId::ALL);

    for output in &summary.outputs {
        println!("{}. {}", output.report.number(), output.report.title());
        println!("{}\n", format_table(&output.table));
    }
    for failure in &summary.failures {
        println!("{}", failure);
    }

    println!("=== Demo Complete ===");
    Ok(())
}
