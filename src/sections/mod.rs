// Multiplexed report stream splitter
//
// The extraction tool runs several checks in one invocation and announces
// each one with a marker line:
// ```
// Start-classes
// android.car.Car
// android.car.CarInfoManager
// Start-annotation-violations
// android.car.Car#getCarManager is missing @AddedInOrBefore
// ```
// Everything after a marker up to the next marker belongs to that section.

use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

/// Marker prefix the extraction tool writes in front of each option id
pub const DEFAULT_MARKER_PREFIX: &str = "Start-";

/// An expected marker never appeared in the stream
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
#[error("section `{marker}` not found in report output")]
#[diagnostic(
    code(apisurface::sections::not_found),
    help("make sure the extraction tool was invoked with every configured option")
)]
pub struct SectionNotFoundError {
    /// Full marker line that was expected, prefix included
    pub marker: String,
}

/// Payload lines of one labeled section
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    /// Marker text without the prefix
    pub label: String,
    pub lines: Vec<String>,
}

impl Section {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Sections in the order the splitter expected them
#[derive(Debug, Clone, Default)]
pub struct Sections {
    sections: Vec<Section>,
}

impl Sections {
    pub fn get(&self, label: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.label == label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// Splits a captured report stream into sections
pub struct SectionSplitter {
    prefix: String,
    expected: Vec<String>,
}

impl SectionSplitter {
    pub fn new(prefix: impl Into<String>, expected: Vec<String>) -> Self {
        Self {
            prefix: prefix.into(),
            expected,
        }
    }

    /// Index of the expected section this line announces, if any
    fn marker_index(&self, line: &str) -> Option<usize> {
        let suffix = line.trim_end().strip_prefix(self.prefix.as_str())?;
        self.expected.iter().position(|e| e == suffix)
    }

    /// Split a full text blob
    pub fn split_text(&self, text: &str) -> Result<Sections, SectionNotFoundError> {
        let lines: Vec<&str> = text.lines().collect();
        self.split(&lines)
    }

    /// Assign every line after the first marker to the most recent marker.
    ///
    /// Lines before the first marker are discarded. A marker that repeats
    /// appends to its existing section.
    pub fn split(&self, lines: &[&str]) -> Result<Sections, SectionNotFoundError> {
        let mut buckets: Vec<Option<Vec<String>>> = vec![None; self.expected.len()];
        let mut current: Option<usize> = None;
        let mut discarded = 0usize;

        for line in lines {
            if let Some(index) = self.marker_index(line) {
                buckets[index].get_or_insert_with(Vec::new);
                current = Some(index);
                continue;
            }

            match current.and_then(|i| buckets[i].as_mut()) {
                Some(bucket) => bucket.push(line.to_string()),
                None => discarded += 1,
            }
        }

        if discarded > 0 {
            debug!("discarded {} lines before the first marker", discarded);
        }

        let sections = self
            .expected
            .iter()
            .zip(buckets)
            .map(|(label, bucket)| match bucket {
                Some(lines) => Ok(Section {
                    label: label.clone(),
                    lines,
                }),
                None => Err(SectionNotFoundError {
                    marker: format!("{}{}", self.prefix, label),
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Sections { sections })
    }
}
