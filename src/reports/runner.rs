// Report runner
// Executes a selection of reports against one data source

use super::{ReportFailure, ReportId};
use crate::source::DataSource;
use crate::storage::table::Table;
use std::time::Instant;
use tracing::{error, info, warn};

/// What to do after a report fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop at the first failure; remaining reports are skipped
    #[default]
    Abort,
    /// Record the failure and run the remaining reports
    Continue,
}

/// A report that produced its table
#[derive(Debug, Clone)]
pub struct ReportOutput {
    pub report: ReportId,
    pub table: Table,
}

/// Everything a run produced
#[derive(Debug, Default)]
pub struct RunSummary {
    pub outputs: Vec<ReportOutput>,
    pub failures: Vec<ReportFailure>,
    /// Reports not attempted because an earlier one failed under `Abort`
    pub skipped: Vec<ReportId>,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn output(&self, report: ReportId) -> Option<&ReportOutput> {
        self.outputs.iter().find(|o| o.report == report)
    }
}

pub struct ReportRunner<'a> {
    source: &'a dyn DataSource,
    policy: FailurePolicy,
}

impl<'a> ReportRunner<'a> {
    pub fn new(source: &'a dyn DataSource, policy: FailurePolicy) -> Self {
        Self { source, policy }
    }

    /// Run `reports` in the given order
    pub fn run(&self, reports: &[ReportId]) -> RunSummary {
        let mut summary = RunSummary::default();

        for (position, &report) in reports.iter().enumerate() {
            info!(report = %report, number = report.number(), "running report");
            let started = Instant::now();

            match report.run(self.source) {
                Ok(table) => {
                    let elapsed = started.elapsed();
                    info!(
                        report = %report,
                        rows = table.row_count(),
                        elapsed_ms = elapsed.as_millis() as u64,
                        "report finished"
                    );
                    summary.outputs.push(ReportOutput { report, table });
                }
                Err(source) => {
                    error!(report = %report, kind = source.kind(), error = %source, "report failed");
                    summary.failures.push(ReportFailure { report, source });

                    if self.policy == FailurePolicy::Abort {
                        summary.skipped = reports[position + 1..].to_vec();
                        if !summary.skipped.is_empty() {
                            warn!(skipped = summary.skipped.len(), "aborting remaining reports");
                        }
                        break;
                    }
                }
            }
        }

        summary
    }
}
