use crate::gate::{PolicyFailure, Verdict};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::PathBuf;

/// JSON reporter for programmatic output
pub struct JsonReporter {
    output_path: Option<PathBuf>,
}

impl JsonReporter {
    pub fn new(output_path: Option<PathBuf>) -> Self {
        Self { output_path }
    }

    pub fn report(&self, verdict: &Verdict) -> Result<()> {
        let report = JsonReport::from_verdict(verdict);
        let json = serde_json::to_string_pretty(&report).into_diagnostic()?;

        if let Some(path) = &self.output_path {
            std::fs::write(path, &json).into_diagnostic()?;
            eprintln!("Report written to: {}", path.display());
        } else {
            println!("{}", json);
        }

        Ok(())
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    version: &'static str,
    passed: bool,
    failures: &'a [PolicyFailure],
}

impl<'a> JsonReport<'a> {
    fn from_verdict(verdict: &'a Verdict) -> Self {
        Self {
            version: "1.0",
            passed: verdict.passed(),
            failures: &verdict.failures,
        }
    }
}
