//! Baseline support for apisurface
//!
//! The baseline is the checked-in list of API symbols the current signature
//! dump is compared against. It is a plain text file with one fully
//! qualified `package.class.member` per line. The comparison path only ever
//! reads it; `update-baseline` is the one command that rewrites it.

use miette::Diagnostic;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::surface::{parse_symbol_list, SurfaceDiffer, SymbolId, SymbolSet};

/// Baseline errors
#[derive(Error, Diagnostic, Debug)]
pub enum BaselineError {
    #[error("Failed to read baseline file {}: {source}", .path.display())]
    #[diagnostic(
        code(apisurface::baseline::missing),
        help("create it with `apisurface update-baseline` or pass --baseline")
    )]
    Missing {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write baseline file {}: {source}", .path.display())]
    #[diagnostic(code(apisurface::baseline::write))]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A recorded API surface
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Baseline {
    /// Where the baseline was read from or will be written to
    pub path: PathBuf,
    pub symbols: SymbolSet,
}

impl Baseline {
    pub fn new(path: impl Into<PathBuf>, symbols: SymbolSet) -> Self {
        Self {
            path: path.into(),
            symbols,
        }
    }

    /// Load a baseline from a file
    pub fn load(path: &Path) -> Result<Self, BaselineError> {
        let content = fs::read_to_string(path).map_err(|source| BaselineError::Missing {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self::new(path, parse_symbol_list(&content)))
    }

    /// Save the baseline, one symbol per line in sorted order
    pub fn save(&self) -> Result<(), BaselineError> {
        let write_err = |source| BaselineError::Write {
            path: self.path.clone(),
            source,
        };

        // Ensure parent directory exists
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let file = fs::File::create(&self.path).map_err(write_err)?;
        let mut writer = BufWriter::new(file);
        for symbol in &self.symbols {
            writeln!(writer, "{}", symbol).map_err(write_err)?;
        }
        writer.flush().map_err(write_err)?;
        Ok(())
    }

    /// Recorded ids with fewer than `components` dot-separated parts
    pub fn shorter_than(&self, components: usize) -> Vec<&SymbolId> {
        self.symbols
            .iter()
            .filter(|id| id.component_count() < components)
            .collect()
    }

    /// Get statistics about how the current surface compares to this baseline
    pub fn stats(&self, current: &SymbolSet) -> BaselineStats {
        let diff = SurfaceDiffer::diff(current, &self.symbols);
        BaselineStats {
            total_in_baseline: self.symbols.len(),
            unchanged: self.symbols.len() - diff.removed.len(),
            added: diff.added.len(),
            removed: diff.removed.len(),
        }
    }
}

/// Statistics about baseline comparison
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaselineStats {
    /// Total symbols recorded in baseline
    pub total_in_baseline: usize,
    /// Symbols present in both
    pub unchanged: usize,
    /// Symbols only in the current surface
    pub added: usize,
    /// Symbols only in the baseline
    pub removed: usize,
}

impl std::fmt::Display for BaselineStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} new, {} deleted ({} unchanged, {} in baseline file)",
            self.added, self.removed, self.unchanged, self.total_in_baseline
        )
    }
}
