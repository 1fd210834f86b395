// Main entry point for the sales-reports CLI
// Runs the report catalog against a database and prints each result

use anyhow::Result;
use clap::Parser as ClapParser;
use sales_reports::config::{DATABASE_ENV, DEFAULT_DATABASE};
use sales_reports::{
    app, DatabaseTarget, FailurePolicy, OutputFormat, ReportId, RunConfig,
};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// sales-reports - canned business reports over a sales database
#[derive(ClapParser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// SQLite database file to read
    #[arg(short, long, env = DATABASE_ENV, default_value = DEFAULT_DATABASE)]
    database: PathBuf,

    /// Load tables from an SQL seed script instead of a database file
    /// (takes precedence over --database and SALES_REPORTS_DB)
    #[arg(long)]
    seed: Option<PathBuf>,

    /// Report to run (repeatable); all reports when omitted
    #[arg(short, long = "report", value_enum)]
    reports: Vec<ReportId>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Write one file per report into this directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Keep running the remaining reports after one fails
    #[arg(short, long)]
    keep_going: bool,

    /// List the available reports and exit
    #[arg(long)]
    list: bool,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn into_config(self) -> RunConfig {
        let target = match self.seed {
            Some(script) => DatabaseTarget::Script(script),
            None => DatabaseTarget::Sqlite(self.database),
        };
        let policy = if self.keep_going {
            FailurePolicy::Continue
        } else {
            FailurePolicy::Abort
        };

        RunConfig::new(target)
            .with_reports(&self.reports)
            .with_format(self.format)
            .with_output_dir(self.output_dir)
            .with_policy(policy)
    }
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_tracing(args.verbose);

    if args.list {
        print_catalog();
        return Ok(ExitCode::SUCCESS);
    }

    let config = args.into_config();
    tracing::debug!(?config, "starting run");

    let mut stdout = io::stdout().lock();
    let summary = app::run(&config, &mut stdout)?;

    for failure in &summary.failures {
        eprintln!("Error: {}", failure);
    }
    for skipped in &summary.skipped {
        eprintln!("Skipped: report {} ({})", skipped.number(), skipped);
    }

    tracing::info!(
        succeeded = summary.outputs.len(),
        failed = summary.failures.len(),
        skipped = summary.skipped.len(),
        "run complete"
    );

    Ok(if summary.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Logs go to stderr so report output on stdout stays clean
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn print_catalog() {
    for report in ReportId::ALL {
        println!("{:>2}  {:<28} {}", report.number(), report.slug(), report.title());
    }
}
