//! Compliance gate
//!
//! Runs the configured policies against one invocation's inputs and
//! produces a [`Verdict`]. Policy failures are ordinary values, not errors:
//! only malformed input is an error. The gate never prints and never exits;
//! the caller renders the verdict and maps it to a process status.

use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::baseline::Baseline;
use crate::config::{Config, RemediationConfig, ANNOTATION_SECTION, CLASSES_SECTION};
use crate::sections::{Section, Sections};
use crate::signature::{FormatError, SignatureParser};
use crate::surface::{parse_symbol_list, DiffResult, SurfaceDiffer, SymbolSet, SymbolSetBuilder};

/// Exit status for a run where a policy failed
pub const POLICY_FAILURE_EXIT: u8 = 1;

/// `package.class.member` has at least three components
const MEMBER_ID_MIN_COMPONENTS: usize = 3;

/// What a surface drift check compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftSubject {
    /// `package.class.member` symbols from the signature dump
    Members,
    /// `package.class` names from the report's classes section
    Classes,
}

impl DriftSubject {
    pub fn display_name(&self) -> &'static str {
        match self {
            DriftSubject::Members => "API members",
            DriftSubject::Classes => "API classes",
        }
    }
}

/// One policy that did not hold
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum PolicyFailure {
    SurfaceDrift {
        subject: DriftSubject,
        baseline: PathBuf,
        #[serde(flatten)]
        diff: DiffResult,
        remediation: String,
    },
    AnnotationCompliance {
        violations: Vec<String>,
        remediation: String,
    },
}

impl PolicyFailure {
    pub fn remediation(&self) -> &str {
        match self {
            PolicyFailure::SurfaceDrift { remediation, .. }
            | PolicyFailure::AnnotationCompliance { remediation, .. } => remediation,
        }
    }
}

/// Outcome of one gate run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub failures: Vec<PolicyFailure>,
}

impl Verdict {
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }

    /// Process exit status for this verdict
    pub fn exit_code(&self) -> u8 {
        if self.passed() {
            0
        } else {
            POLICY_FAILURE_EXIT
        }
    }
}

/// Everything one gate run looks at
#[derive(Debug, Clone, Copy)]
pub struct GateInput<'a> {
    /// Current signature dump text
    pub signature: &'a str,
    /// Member-level baseline
    pub baseline: &'a Baseline,
    /// Split output of the extraction tool, when it was run
    pub report: Option<&'a Sections>,
    /// Class-level baseline, checked against the classes section
    pub classes_baseline: Option<&'a Baseline>,
}

/// Applies surface drift and annotation compliance policies
pub struct ComplianceGate {
    parser: SignatureParser,
    remediation: RemediationConfig,
}

impl ComplianceGate {
    pub fn new(parser: SignatureParser, remediation: RemediationConfig) -> Self {
        Self {
            parser,
            remediation,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            SignatureParser::new(config.signature.header.clone()),
            config.remediation.clone(),
        )
    }

    /// Run every applicable policy.
    ///
    /// Fails only when the signature text is malformed.
    pub fn evaluate(&self, input: GateInput<'_>) -> Result<Verdict, FormatError> {
        let mut verdict = Verdict::default();

        let packages = self.parser.parse(input.signature)?;
        let current = SymbolSetBuilder::build(&packages);
        info!(
            "Parsed {} packages, {} members, {} symbols",
            packages.len(),
            packages.iter().map(|p| p.member_count()).sum::<usize>(),
            current.len()
        );

        for id in input.baseline.shorter_than(MEMBER_ID_MIN_COMPONENTS) {
            warn!(
                "Baseline {} entry `{}` is not a package.class.member id",
                input.baseline.path.display(),
                id
            );
        }

        verdict.failures.extend(self.check_surface_drift(
            DriftSubject::Members,
            &current,
            input.baseline,
        ));

        if let Some(report) = input.report {
            if let Some(classes_baseline) = input.classes_baseline {
                match report.get(CLASSES_SECTION) {
                    Some(section) => verdict
                        .failures
                        .extend(self.check_class_drift(section, classes_baseline)),
                    None => warn!(
                        "Class baseline configured but report has no `{}` section",
                        CLASSES_SECTION
                    ),
                }
            }

            if let Some(section) = report.get(ANNOTATION_SECTION) {
                verdict.failures.extend(self.check_annotations(section));
            }
        }

        debug!("{} policy failures", verdict.failures.len());
        Ok(verdict)
    }

    /// Compare a symbol set against its baseline
    pub fn check_surface_drift(
        &self,
        subject: DriftSubject,
        current: &SymbolSet,
        baseline: &Baseline,
    ) -> Option<PolicyFailure> {
        let diff = SurfaceDiffer::diff(current, &baseline.symbols);
        info!("{}: {}", subject.display_name(), baseline.stats(current));
        if diff.is_empty() {
            return None;
        }

        Some(PolicyFailure::SurfaceDrift {
            subject,
            baseline: baseline.path.clone(),
            diff,
            remediation: format!(
                "Run `{}` to regenerate the baseline, then run `{}`.",
                self.remediation.update_command, self.remediation.test_command
            ),
        })
    }

    /// Compare the classes section against the class-level baseline
    pub fn check_class_drift(&self, section: &Section, baseline: &Baseline) -> Option<PolicyFailure> {
        let current = parse_symbol_list(&section.lines.join("\n"));
        self.check_surface_drift(DriftSubject::Classes, &current, baseline)
    }

    /// Every line of the section is a violation
    pub fn check_annotations(&self, section: &Section) -> Option<PolicyFailure> {
        if section.is_empty() {
            return None;
        }

        Some(PolicyFailure::AnnotationCompliance {
            violations: section.lines.clone(),
            remediation: format!(
                "Add the required version annotation to every API listed above. See {} for the rules.",
                self.remediation.annotation_docs
            ),
        })
    }
}
