// External API extraction tool
//
// The extraction tool is a separate jar that scans the built API and writes
// one marker-delimited section per requested option to stdout. It is run
// to completion and its whole output captured before any splitting.

use miette::Diagnostic;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::Config;

#[derive(Error, Diagnostic, Debug)]
pub enum ExtractorError {
    #[error("No JDK found: JAVA_HOME is not set and {} has no bin/java", .searched.display())]
    #[diagnostic(
        code(apisurface::extractor::jdk),
        help("set JAVA_HOME or pass --java-home")
    )]
    JdkNotFound { searched: PathBuf },

    #[error("Failed to start {}: {source}", .program.display())]
    #[diagnostic(code(apisurface::extractor::spawn))]
    Spawn {
        program: PathBuf,
        source: std::io::Error,
    },

    #[error("Extraction tool exited with {status}: {stderr}")]
    #[diagnostic(code(apisurface::extractor::failed))]
    ToolFailed { status: String, stderr: String },
}

/// A resolved invocation of the extraction tool
#[derive(Debug, Clone)]
pub struct Extractor {
    java: PathBuf,
    jar: PathBuf,
    args: Vec<String>,
    working_dir: PathBuf,
}

impl Extractor {
    /// Resolve the java binary and build the argument list.
    ///
    /// `java_home` wins when given; otherwise the newest JDK under the
    /// configured search path in the workspace root is used.
    pub fn locate(config: &Config, java_home: Option<&Path>) -> Result<Self, ExtractorError> {
        let java = match java_home {
            Some(home) => home.join("bin").join("java"),
            None => {
                let search_root = config.resolve(&config.extractor.jdk_search_path);
                find_java(&search_root).ok_or(ExtractorError::JdkNotFound {
                    searched: search_root,
                })?
            }
        };
        debug!("Using java at {:?}", java);

        let mut args = config.extractor.args.clone();
        args.extend(config.signature.sections.iter().map(|s| format!("--{}", s)));

        Ok(Self {
            java,
            jar: config.resolve(&config.extractor.jar),
            args,
            working_dir: config.root(),
        })
    }

    pub fn java(&self) -> &Path {
        &self.java
    }

    /// Arguments after `-jar <jar>`
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Run the tool and capture its full stdout
    pub fn run(&self) -> Result<String, ExtractorError> {
        info!("Running extraction tool {:?}", self.jar);
        let output = Command::new(&self.java)
            .arg("-jar")
            .arg(&self.jar)
            .args(&self.args)
            .current_dir(&self.working_dir)
            .output()
            .map_err(|source| ExtractorError::Spawn {
                program: self.java.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ExtractorError::ToolFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Newest `bin/java` below `search_root`.
///
/// Candidates are ranked by the number in their `jdkNN` directory, then by
/// path so the pick is stable.
fn find_java(search_root: &Path) -> Option<PathBuf> {
    WalkDir::new(search_root)
        .max_depth(4)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && e.file_name() == "java")
        .map(|e| e.into_path())
        .filter(|p| p.parent().and_then(|d| d.file_name()) == Some(OsStr::new("bin")))
        .max_by(|a, b| {
            jdk_version(search_root, a)
                .cmp(&jdk_version(search_root, b))
                .then_with(|| a.cmp(b))
        })
}

/// Major version from the first `jdkNN` component under `search_root`, 0 if none
fn jdk_version(search_root: &Path, java: &Path) -> u32 {
    java.strip_prefix(search_root)
        .unwrap_or(java)
        .components()
        .filter_map(|c| c.as_os_str().to_str())
        .find_map(|name| {
            let digits: String = name
                .strip_prefix("jdk")?
                .chars()
                .take_while(char::is_ascii_digit)
                .collect();
            digits.parse().ok()
        })
        .unwrap_or(0)
}
