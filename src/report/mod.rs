pub mod terminal;
pub mod json;

pub use terminal::TerminalReporter;
pub use json::JsonReporter;

use crate::gate::Verdict;
use miette::Result;
use std::path::PathBuf;

/// Output format for reports
#[derive(Debug, Clone, Default)]
pub enum ReportFormat {
    #[default]
    Terminal,
    Json,
}

/// Reporter for outputting gate verdicts
pub struct Reporter {
    format: ReportFormat,
    output_path: Option<PathBuf>,
}

impl Reporter {
    pub fn new(format: ReportFormat, output_path: Option<PathBuf>) -> Self {
        Self { format, output_path }
    }

    /// Report the verdict
    pub fn report(&self, verdict: &Verdict) -> Result<()> {
        match &self.format {
            ReportFormat::Terminal => {
                let reporter = TerminalReporter::new(self.output_path.clone());
                reporter.report(verdict)
            }
            ReportFormat::Json => {
                let reporter = JsonReporter::new(self.output_path.clone());
                reporter.report(verdict)
            }
        }
    }
}
