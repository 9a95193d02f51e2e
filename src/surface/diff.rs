use super::{SymbolId, SymbolSet};
use serde::Serialize;

/// Symbols gained and lost relative to a baseline, both sorted ascending
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiffResult {
    /// In current, absent from baseline
    pub added: Vec<SymbolId>,
    /// In baseline, absent from current
    pub removed: Vec<SymbolId>,
}

impl DiffResult {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

impl std::fmt::Display for DiffResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} new, {} deleted", self.added.len(), self.removed.len())
    }
}

/// Set difference between two symbol sets
pub struct SurfaceDiffer;

impl SurfaceDiffer {
    pub fn diff(current: &SymbolSet, baseline: &SymbolSet) -> DiffResult {
        // BTreeSet iteration order keeps both lists sorted
        DiffResult {
            added: current.difference(baseline).cloned().collect(),
            removed: baseline.difference(current).cloned().collect(),
        }
    }
}
