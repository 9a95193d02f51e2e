//! apisurface - API surface gate for Android signature dumps
//!
//! This library parses API signature files, flattens them into comparable
//! symbol sets and decides whether a change may pass CI.
//!
//! # Architecture
//!
//! The check pipeline consists of:
//! 1. **Parsing** - Split a signature dump into packages, classes and members
//! 2. **Symbol sets** - Flatten members into `package.class.member` ids
//! 3. **Diffing** - Compare against the recorded baseline
//! 4. **Sections** - Split the extraction tool's multiplexed output
//! 5. **Gate** - Apply surface drift and annotation policies
//! 6. **Reporting** - Output the verdict with remediation steps

pub mod baseline;
pub mod config;
pub mod extractor;
pub mod gate;
pub mod report;
pub mod sections;
pub mod signature;
pub mod surface;

pub use baseline::{Baseline, BaselineError};
pub use config::Config;
pub use extractor::{Extractor, ExtractorError};
pub use gate::{ComplianceGate, GateInput, PolicyFailure, Verdict};
pub use report::{ReportFormat, Reporter};
pub use sections::{Section, SectionNotFoundError, SectionSplitter, Sections};
pub use signature::{normalize_params, FormatError, Member, MemberKind, Package, SignatureParser};
pub use surface::{DiffResult, SurfaceDiffer, SymbolId, SymbolSet, SymbolSetBuilder};
