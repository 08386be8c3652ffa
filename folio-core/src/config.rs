//! Pipeline configuration parsing and management.

use folio_types::DocumentType;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Invalid numbering format for {0}: {1}")]
    InvalidNumbering(String, String),
}

/// How in-document errors are treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Log, substitute an error marker at the call site and keep compiling
    #[default]
    Lenient,
    /// Log and abort on the first error
    Strict,
}

/// Options for a compilation pipeline, matching the `folio.yml` schema
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineOptions {
    #[serde(default)]
    pub policy: ErrorPolicy,

    /// Base directory for files referenced from documents
    #[serde(default)]
    pub working_dir: Option<PathBuf>,

    #[serde(default)]
    pub document: DocumentDefaults,

    #[serde(default)]
    pub numbering: NumberingDefaults,

    #[serde(default)]
    pub render: RenderOptions,

    // Internal: path to config file (for relative path resolution)
    #[serde(skip)]
    config_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentDefaults {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default, rename = "type")]
    pub doc_type: DocumentType,

    #[serde(default)]
    pub locale: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NumberingDefaults {
    #[serde(default)]
    pub headings: Option<String>,

    #[serde(default)]
    pub code: Option<String>,

    #[serde(default)]
    pub math: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Wrap rendered output in the renderer's document frame
    #[serde(default)]
    pub wrap: bool,
}

impl PipelineOptions {
    /// Load options from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let mut options = Self::from_yaml(&contents)?;

        // Store config file path for relative path resolution
        options.config_path = Some(path.to_path_buf());

        Ok(options)
    }

    /// Parse options from YAML text
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let options: PipelineOptions = serde_yaml::from_str(contents)?;
        Ok(options)
    }

    pub fn strict() -> Self {
        Self {
            policy: ErrorPolicy::Strict,
            ..Default::default()
        }
    }

    pub fn with_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn is_strict(&self) -> bool {
        self.policy == ErrorPolicy::Strict
    }

    /// Resolve a path referenced from a document.
    ///
    /// Relative paths resolve against the working directory, then against
    /// the config file location.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else if let Some(dir) = &self.working_dir {
            dir.join(path)
        } else if let Some(parent) = self.config_path.as_ref().and_then(|p| p.parent()) {
            parent.join(path)
        } else {
            path.to_path_buf()
        }
    }
}
