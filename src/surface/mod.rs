//! API surface symbol sets
//!
//! A parsed signature hierarchy is flattened into `package.class.member`
//! identifiers. Overloads deliberately collapse: `createCar(Context)` and
//! `createCar(Context, Handler)` are the same symbol. A field and a method
//! with the same fully qualified name collapse as well; callers that need
//! the distinction use [`SymbolSetBuilder::build_by_kind`].

mod diff;

pub use diff::{DiffResult, SurfaceDiffer};

use crate::signature::{MemberKind, Package};
use serde::{Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use tracing::warn;

/// Fully qualified `package.class.member` identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SymbolId(String);

impl SymbolId {
    /// Build an id from its components, refusing empty ones
    pub fn new(package: &str, class: &str, member: &str) -> Option<Self> {
        if package.is_empty() || class.is_empty() || member.is_empty() {
            return None;
        }
        Some(Self(format!("{}.{}.{}", package, class, member)))
    }

    /// Wrap an already-qualified identifier, e.g. one line of a baseline file
    pub fn from_qualified(id: &str) -> Option<Self> {
        let id = id.trim();
        if id.is_empty() || id.split('.').any(str::is_empty) {
            return None;
        }
        Some(Self(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of dot-separated components
    pub fn component_count(&self) -> usize {
        self.0.split('.').count()
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for SymbolId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Sorted, duplicate-free set of symbols
pub type SymbolSet = BTreeSet<SymbolId>;

/// Flattens parsed packages into symbol sets
pub struct SymbolSetBuilder;

impl SymbolSetBuilder {
    /// One id per distinct member name of every class, methods and fields mixed
    pub fn build(packages: &[Package]) -> SymbolSet {
        Self::members(packages, |_| true)
    }

    /// Separate `(methods, fields)` sets
    pub fn build_by_kind(packages: &[Package]) -> (SymbolSet, SymbolSet) {
        (
            Self::members(packages, |k| k == MemberKind::Method),
            Self::members(packages, |k| k == MemberKind::Field),
        )
    }

    /// `package.class` ids for every class, members ignored
    pub fn classes(packages: &[Package]) -> SymbolSet {
        packages
            .iter()
            .flat_map(|p| p.classes.iter().map(move |c| (p, c)))
            .filter_map(|(p, c)| SymbolId::from_qualified(&format!("{}.{}", p.name, c.name)))
            .collect()
    }

    /// `package.class.descriptor` entries with parameter names removed.
    ///
    /// Unlike [`build`](Self::build) this keeps overloads apart.
    pub fn signatures(packages: &[Package]) -> BTreeSet<String> {
        let mut signatures = BTreeSet::new();
        for package in packages {
            for class in &package.classes {
                for member in &class.members {
                    signatures.insert(format!(
                        "{}.{}: {}",
                        package.name,
                        class.name,
                        member.normalized_descriptor()
                    ));
                }
            }
        }
        signatures
    }

    fn members(packages: &[Package], keep: impl Fn(MemberKind) -> bool) -> SymbolSet {
        let mut set = SymbolSet::new();
        for package in packages {
            for class in &package.classes {
                for member in class.members.iter().filter(|m| keep(m.kind)) {
                    if let Some(id) = SymbolId::new(&package.name, &class.name, &member.name) {
                        set.insert(id);
                    }
                }
            }
        }
        set
    }
}

/// Parse a newline-delimited list of qualified ids.
///
/// Blank lines are skipped silently, malformed ones with a warning.
pub fn parse_symbol_list(content: &str) -> SymbolSet {
    let mut set = SymbolSet::new();
    for (index, line) in content.lines().enumerate() {
        match SymbolId::from_qualified(line) {
            Some(id) => {
                set.insert(id);
            }
            None if line.trim().is_empty() => {}
            None => warn!("skipping malformed symbol on line {}: `{}`", index + 1, line.trim()),
        }
    }
    set
}
