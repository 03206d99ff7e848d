//! Load configuration (stemma.toml)

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::DEFAULT_STREAMING_THRESHOLD_MB;

/// Configuration for one manifest load.
///
/// Passed explicitly into `load` rather than read from ambient global
/// state, so mode selection and decoding stay deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadConfig {
    /// Opt into the streaming manifest decoder for large manifests
    #[serde(default)]
    pub enable_streaming: bool,

    /// Manifest size (megabytes) at which streaming decode kicks in.
    /// Zero means "always stream when enabled".
    #[serde(default = "default_streaming_threshold_mb")]
    pub streaming_threshold_mb: u64,

    /// Named selector to filter the graph with; `None` keeps every node
    #[serde(default)]
    pub selector: Option<String>,
}

fn default_streaming_threshold_mb() -> u64 {
    DEFAULT_STREAMING_THRESHOLD_MB
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            enable_streaming: false,
            streaming_threshold_mb: DEFAULT_STREAMING_THRESHOLD_MB,
            selector: None,
        }
    }
}

impl LoadConfig {
    /// Load config from TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Self::from_toml(&contents)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}
