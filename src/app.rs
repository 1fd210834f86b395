//! One complete run: open the session, run the reports, write them, close.

use crate::config::RunConfig;
use crate::error::Result;
use crate::output::{render, OutputFormat};
use crate::reports::{ReportOutput, ReportRunner, RunSummary};
use crate::source::Session;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Run `config`, writing report output to `out` (or to `config.output_dir`)
///
/// Report failures are returned in the summary, not as an error. An error is
/// returned only when the session cannot be opened or output cannot be written.
/// The session is closed on every path once it has been opened.
pub fn run(config: &RunConfig, out: &mut dyn Write) -> Result<RunSummary> {
    let session = Session::open(&config.target)?;
    let summary = ReportRunner::new(session.source(), config.policy).run(&config.reports);

    let written = write_outputs(&summary.outputs, config, out);
    let closed = session.close();
    written?;
    closed?;

    Ok(summary)
}

/// Write every output, in run order
pub fn write_outputs(outputs: &[ReportOutput], config: &RunConfig, out: &mut dyn Write) -> Result<()> {
    if let Some(dir) = &config.output_dir {
        fs::create_dir_all(dir)?;
    }

    for output in outputs {
        let rendered = render(&output.table, config.format)?;
        match &config.output_dir {
            Some(dir) => write_file(dir, output, config.format, &rendered)?,
            None => {
                match config.format {
                    OutputFormat::Table => writeln!(
                        out,
                        "{}. {}",
                        output.report.number(),
                        output.report.title()
                    )?,
                    OutputFormat::Csv => writeln!(out, "# {}", output.report.slug())?,
                    OutputFormat::Json => {}
                }
                out.write_all(rendered.as_bytes())?;
                writeln!(out)?;
            }
        }
    }

    out.flush()?;
    Ok(())
}

fn write_file(dir: &Path, output: &ReportOutput, format: OutputFormat, rendered: &str) -> Result<()> {
    let path = dir.join(format!(
        "{:02}-{}.{}",
        output.report.number(),
        output.report.slug(),
        format.extension()
    ));
    fs::write(&path, rendered)?;
    info!(report = %output.report, path = %path.display(), "report written");
    Ok(())
}
