use crate::gate::{PolicyFailure, Verdict};
use crate::surface::SymbolId;
use colored::Colorize;
use miette::{IntoDiagnostic, Result};
use std::io::{self, Write};
use std::path::PathBuf;

/// Terminal reporter with colored headers.
///
/// Symbol and violation lines are written uncolored so CI logs can be
/// grepped and diffed.
pub struct TerminalReporter {
    output_path: Option<PathBuf>,
}

impl TerminalReporter {
    pub fn new(output_path: Option<PathBuf>) -> Self {
        Self { output_path }
    }

    pub fn report(&self, verdict: &Verdict) -> Result<()> {
        // A passing gate stays silent
        if verdict.passed() {
            return Ok(());
        }

        match &self.output_path {
            Some(path) => {
                let mut file = std::fs::File::create(path).into_diagnostic()?;
                render(verdict, &mut file).into_diagnostic()?;
            }
            None => {
                let stdout = io::stdout();
                render(verdict, &mut stdout.lock()).into_diagnostic()?;
            }
        }
        Ok(())
    }
}

/// Write the human-readable diagnostics for every failure
pub fn render(verdict: &Verdict, out: &mut impl Write) -> io::Result<()> {
    for failure in &verdict.failures {
        match failure {
            PolicyFailure::SurfaceDrift {
                subject,
                baseline,
                diff,
                ..
            } => {
                writeln!(
                    out,
                    "{}",
                    format!(
                        "{} do not match baseline {} ({})",
                        subject.display_name(),
                        baseline.display(),
                        diff
                    )
                    .red()
                    .bold()
                )?;
                print_symbols(out, "deleted", &diff.removed)?;
                print_symbols(out, "new", &diff.added)?;
            }
            PolicyFailure::AnnotationCompliance { violations, .. } => {
                writeln!(
                    out,
                    "{}",
                    format!("{} API uses are missing a version annotation:", violations.len())
                        .red()
                        .bold()
                )?;
                for line in violations {
                    writeln!(out, "{}", line)?;
                }
            }
        }

        writeln!(out, "{}", failure.remediation().yellow())?;
        writeln!(out)?;
    }
    Ok(())
}

fn print_symbols(out: &mut impl Write, label: &str, symbols: &[SymbolId]) -> io::Result<()> {
    writeln!(out, "{}:", label.bold())?;
    if symbols.is_empty() {
        writeln!(out, "  {}", "(none)".dimmed())?;
    }
    for symbol in symbols {
        writeln!(out, "  {}", symbol)?;
    }
    Ok(())
}
