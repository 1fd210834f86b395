//! Run configuration: which database, which reports, how to write them.

use crate::output::OutputFormat;
use crate::reports::{FailurePolicy, ReportId};
use crate::source::DatabaseTarget;
use std::path::PathBuf;

/// Database file read when none is given
pub const DEFAULT_DATABASE: &str = "data.sqlite";

/// Environment variable overriding the database path
pub const DATABASE_ENV: &str = "SALES_REPORTS_DB";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub target: DatabaseTarget,
    /// Reports to run, in order, without duplicates
    pub reports: Vec<ReportId>,
    pub format: OutputFormat,
    /// Write one file per report here instead of to the output stream
    pub output_dir: Option<PathBuf>,
    pub policy: FailurePolicy,
}

impl RunConfig {
    /// Every report, table output, abort on first failure
    pub fn new(target: DatabaseTarget) -> Self {
        Self {
            target,
            reports: ReportId::ALL.to_vec(),
            format: OutputFormat::default(),
            output_dir: None,
            policy: FailurePolicy::default(),
        }
    }

    /// Restrict the run to `reports`; an empty selection keeps all of them
    pub fn with_reports(mut self, reports: &[ReportId]) -> Self {
        if !reports.is_empty() {
            let mut selected: Vec<ReportId> = Vec::with_capacity(reports.len());
            for &report in reports {
                if !selected.contains(&report) {
                    selected.push(report);
                }
            }
            self.reports = selected;
        }
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_output_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.output_dir = dir;
        self
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }
}
