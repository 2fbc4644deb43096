use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::issue::{Severity, ValidationIssue};

/// Outcome of validating one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
  pub path:          PathBuf,
  pub issues:        Vec<ValidationIssue>,
  pub size_bytes:    u64,
  pub line_count:    usize,
  pub heading_count: usize,
  pub link_count:    usize,
  pub image_count:   usize,
  pub has_metadata:  bool,
}

impl ValidationResult {
  /// A result carrying a single issue and no statistics.
  #[must_use]
  pub fn failed(path: PathBuf, issue: ValidationIssue) -> Self {
    Self {
      path,
      issues: vec![issue],
      ..Self::default()
    }
  }

  /// False iff any issue is an error.
  #[must_use]
  pub fn is_valid(&self) -> bool {
    !self.issues.iter().any(ValidationIssue::is_error)
  }

  #[must_use]
  pub fn count(&self, severity: Severity) -> usize {
    self
      .issues
      .iter()
      .filter(|issue| issue.severity == severity)
      .count()
  }
}
