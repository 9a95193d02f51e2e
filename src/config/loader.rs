use miette::{IntoDiagnostic, Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::sections::DEFAULT_MARKER_PREFIX;
use crate::signature::DEFAULT_HEADER;

/// Section carrying the list of classes on the API surface
pub const CLASSES_SECTION: &str = "classes";

/// Section carrying API uses that lack a version annotation
pub const ANNOTATION_SECTION: &str = "annotation-violations";

/// Configuration for an apisurface run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Workspace root; relative paths below resolve against it
    pub workspace_root: Option<PathBuf>,

    /// Signature and report stream format
    pub signature: SignatureConfig,

    /// Baseline locations
    pub baseline: BaselineConfig,

    /// Remediation text shown on policy failures
    pub remediation: RemediationConfig,

    /// External extraction tool
    pub extractor: ExtractorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SignatureConfig {
    /// Required first line of a signature dump
    pub header: String,

    /// Prefix of marker lines in the extraction tool's output
    pub marker_prefix: String,

    /// Option ids the extraction tool is run with, in output order
    pub sections: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BaselineConfig {
    /// Member-level baseline list
    pub path: PathBuf,

    /// Optional class-level baseline checked against the `classes` section
    pub classes_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemediationConfig {
    /// Command that regenerates the baseline
    pub update_command: String,

    /// Test to run after regenerating
    pub test_command: String,

    /// Where the version annotation rules are documented
    pub annotation_docs: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Extraction tool jar
    pub jar: PathBuf,

    /// Extra arguments passed before the section options
    pub args: Vec<String>,

    /// Directory searched for a JDK when none is given
    pub jdk_search_path: PathBuf,
}

impl Default for SignatureConfig {
    fn default() -> Self {
        Self {
            header: DEFAULT_HEADER.to_string(),
            marker_prefix: DEFAULT_MARKER_PREFIX.to_string(),
            sections: vec![CLASSES_SECTION.to_string(), ANNOTATION_SECTION.to_string()],
        }
    }
}

impl Default for BaselineConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("tests/api-list.txt"),
            classes_path: None,
        }
    }
}

impl Default for RemediationConfig {
    fn default() -> Self {
        Self {
            update_command: "apisurface update-baseline --signature api/current.txt".to_string(),
            test_command: "atest ApiSurfaceTest".to_string(),
            annotation_docs: "docs/api-versioning.md".to_string(),
        }
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            jar: PathBuf::from("out/host/linux-x86/framework/api-extractor.jar"),
            args: vec![],
            jdk_search_path: PathBuf::from("prebuilts/jdk"),
        }
    }
}

impl Config {
    /// Load configuration from a file (YAML or TOML)
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        match extension {
            "yml" | "yaml" => serde_yaml::from_str(&contents)
                .into_diagnostic()
                .wrap_err("Failed to parse YAML config"),
            "toml" => toml::from_str(&contents)
                .into_diagnostic()
                .wrap_err("Failed to parse TOML config"),
            _ => {
                // Try YAML first, then TOML
                if let Ok(config) = serde_yaml::from_str(&contents) {
                    Ok(config)
                } else {
                    toml::from_str(&contents)
                        .into_diagnostic()
                        .wrap_err("Failed to parse config file")
                }
            }
        }
    }

    /// Try to load configuration from default locations
    pub fn from_default_locations(workspace_root: &Path) -> Result<Self> {
        let default_names = [
            ".apisurface.toml",
            ".apisurface.yml",
            ".apisurface.yaml",
            "apisurface.toml",
            "apisurface.yml",
            "apisurface.yaml",
        ];

        for name in &default_names {
            let path = workspace_root.join(name);
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        // No config file found, use defaults
        Ok(Self::default())
    }

    /// Workspace root, falling back to the current directory
    pub fn root(&self) -> PathBuf {
        self.workspace_root
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Resolve a configured path against the workspace root
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root().join(path)
        }
    }

    pub fn baseline_path(&self) -> PathBuf {
        self.resolve(&self.baseline.path)
    }

    pub fn classes_baseline_path(&self) -> Option<PathBuf> {
        self.baseline.classes_path.as_deref().map(|p| self.resolve(p))
    }
}
