use std::{io, path::PathBuf};

use thiserror::Error;

/// Error type for mdpress-analysis operations.
#[derive(Debug, Error)]
pub enum AnalysisError {
  #[error("Failed to read {}: {source}", path.display())]
  Read {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("YAML error: {0}")]
  Yaml(#[from] serde_yaml::Error),

  #[error("Unknown theme '{0}'. Expected light, dark or auto")]
  UnknownTheme(String),

  #[error("Front matter must be a mapping, found {0}")]
  FrontMatterShape(&'static str),

  #[error("Serde error: {0}")]
  Serde(#[from] serde_json::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AnalysisError>;
