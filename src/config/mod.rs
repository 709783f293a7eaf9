//! Configuration loading
//!
//! Supports TOML (preferred), YAML, and JSON config files, looked up from
//! a handful of default locations when no path is given explicitly.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Default config file names, tried in order
const DEFAULT_LOCATIONS: [&str; 3] = [".leakflow.toml", "leakflow.toml", ".leakflow.yml"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("failed to parse YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("failed to parse JSON config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported config extension: {0}")]
    UnsupportedExtension(String),
}

/// Project-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directories to analyze (relative to the project root)
    pub targets: Vec<PathBuf>,

    /// Regex patterns for paths to skip
    pub exclude: Vec<String>,

    /// Detectors to run (flag names); empty means all
    pub detect: Vec<String>,

    /// Minimum confidence to report: low, medium, high
    pub min_confidence: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            targets: Vec::new(),
            exclude: vec![
                r"/build/".to_string(),
                r"/\.gradle/".to_string(),
                r"/generated/".to_string(),
            ],
            detect: Vec::new(),
            min_confidence: None,
        }
    }
}

impl Config {
    /// Load configuration from an explicit file path
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        let config = match extension.as_str() {
            "toml" => toml::from_str(&content)?,
            "yml" | "yaml" => serde_yaml::from_str(&content)?,
            "json" => serde_json::from_str(&content)?,
            other => return Err(ConfigError::UnsupportedExtension(other.to_string())),
        };
        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Look for a config file in the default locations under `root`,
    /// falling back to defaults when none exists
    pub fn from_default_locations(root: &Path) -> Result<Self, ConfigError> {
        for name in DEFAULT_LOCATIONS {
            let candidate = root.join(name);
            if candidate.is_file() {
                return Self::from_file(&candidate);
            }
        }
        Ok(Self::default())
    }
}
