//! Rule-based validation of raw Markdown documents.
//!
//! A [`Validator`] owns its [`ValidationOptions`], a [`FileSystem`] and an
//! ordered rule set. Validating a document never fails: unreadable files and
//! panics inside the rule pass are reported as issues on that document, so a
//! batch always produces one result per input.
pub mod fs;
pub mod issue;
pub mod result;
pub mod rules;
pub mod source;

use std::{
  collections::BTreeMap,
  panic::{AssertUnwindSafe, catch_unwind},
  path::{Path, PathBuf},
};

use log::{debug, error, trace, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

pub use self::{
  fs::{DiskFs, FileSystem, MemoryFs},
  issue::{IssueKind, Severity, ValidationIssue},
  result::ValidationResult,
  rules::{Rule, RuleContext, default_rules},
  source::SourceDocument,
};
use crate::utils::collect_markdown_files;

/// Characters outside ASCII that are accepted without a warning.
pub const DEFAULT_ALLOWED_NON_ASCII: &str = "áéíóúñüÁÉÍÓÚÑÜ";

/// Knobs for a validation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationOptions {
  pub check_broken_links:   bool,
  pub check_missing_images: bool,
  pub check_empty_files:    bool,
  pub max_file_size_mb:     u64,
  pub max_line_length:      usize,
  pub max_emojis:           usize,
  pub allowed_non_ascii:    String,
}

impl Default for ValidationOptions {
  fn default() -> Self {
    Self {
      check_broken_links:   true,
      check_missing_images: true,
      check_empty_files:    true,
      max_file_size_mb:     10,
      max_line_length:      120,
      max_emojis:           20,
      allowed_non_ascii:    DEFAULT_ALLOWED_NON_ASCII.to_string(),
    }
  }
}

/// Validates documents against an ordered rule set.
pub struct Validator<F = DiskFs> {
  options: ValidationOptions,
  fs:      F,
  rules:   Vec<Box<dyn Rule>>,
}

impl Validator<DiskFs> {
  /// Validator over the real filesystem with the default rules.
  #[must_use]
  pub fn on_disk(options: ValidationOptions) -> Self {
    Self::new(options, DiskFs)
  }
}

impl<F: FileSystem> Validator<F> {
  #[must_use]
  pub fn new(options: ValidationOptions, fs: F) -> Self {
    Self {
      options,
      fs,
      rules: default_rules(),
    }
  }

  /// Replace the rule set.
  #[must_use]
  pub fn with_rules(mut self, rules: Vec<Box<dyn Rule>>) -> Self {
    self.rules = rules;
    self
  }

  #[must_use]
  pub const fn options(&self) -> &ValidationOptions {
    &self.options
  }

  /// Validate one document.
  #[must_use]
  pub fn validate_file(&self, path: &Path) -> ValidationResult {
    debug!("Validating {}", path.display());

    if !self.fs.exists(path) {
      let name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
      return ValidationResult::failed(
        path.to_path_buf(),
        ValidationIssue::new(
          IssueKind::FileNotFound,
          format!("File does not exist: {name}"),
        )
        .with_suggestion("Check that the file exists at the given path"),
      );
    }

    let size_bytes = match self.fs.size(path) {
      Ok(size) => size,
      Err(e) => return Self::failure(path, &e),
    };
    let text = match self.fs.read_to_string(path) {
      Ok(text) => text,
      Err(e) => return Self::failure(path, &e),
    };

    self.validate_source(path, &text, size_bytes)
  }

  /// Validate already loaded text as if it lived at `path`.
  #[must_use]
  pub fn validate_source(
    &self,
    path: &Path,
    text: &str,
    size_bytes: u64,
  ) -> ValidationResult {
    match catch_unwind(AssertUnwindSafe(|| self.run_rules(path, text, size_bytes))) {
      Ok(result) => result,
      Err(panic_err) => {
        error!("Panic while validating {}: {panic_err:?}", path.display());
        ValidationResult::failed(
          path.to_path_buf(),
          ValidationIssue::new(
            IssueKind::ValidationError,
            "Unexpected error during validation",
          )
          .with_suggestion("Check that the file is not corrupted and is valid Markdown"),
        )
      },
    }
  }

  /// Validate many documents in parallel. Results are keyed by path.
  #[must_use]
  pub fn validate_batch(&self, paths: &[PathBuf]) -> BTreeMap<PathBuf, ValidationResult> {
    paths
      .par_iter()
      .map(|path| (path.clone(), self.validate_file(path)))
      .collect()
  }

  /// Validate every Markdown file under `dir`. A missing directory yields no
  /// results.
  #[must_use]
  pub fn validate_directory(&self, dir: &Path) -> BTreeMap<PathBuf, ValidationResult> {
    if !dir.is_dir() {
      warn!("Input directory {} does not exist", dir.display());
      return BTreeMap::new();
    }
    self.validate_batch(&collect_markdown_files(dir))
  }

  fn failure(path: &Path, err: &std::io::Error) -> ValidationResult {
    warn!("Could not read {}: {err}", path.display());
    ValidationResult::failed(
      path.to_path_buf(),
      ValidationIssue::new(
        IssueKind::ValidationError,
        format!("Unexpected error during validation: {err}"),
      )
      .with_suggestion("Check that the file is not corrupted and is valid UTF-8 Markdown"),
    )
  }

  fn run_rules(&self, path: &Path, text: &str, size_bytes: u64) -> ValidationResult {
    let doc = SourceDocument::scan(path, text);
    let mut result = ValidationResult {
      path: path.to_path_buf(),
      issues: Vec::new(),
      size_bytes,
      line_count: doc.lines.len(),
      heading_count: doc.headings.len(),
      link_count: doc.links.len(),
      image_count: doc.images.len(),
      has_metadata: doc.front_matter.is_some(),
    };

    let max_bytes = self.options.max_file_size_mb.saturating_mul(1024 * 1024);
    if size_bytes > max_bytes {
      #[allow(clippy::cast_precision_loss, reason = "Display only")]
      let mib = size_bytes as f64 / 1024.0 / 1024.0;
      result.issues.push(
        ValidationIssue::new(
          IssueKind::FileTooLarge,
          format!(
            "File is very large: {mib:.2}MB (maximum {}MB)",
            self.options.max_file_size_mb
          ),
        )
        .with_suggestion("Consider splitting the document into smaller files"),
      );
    }

    if self.options.check_empty_files && doc.is_blank() {
      result.issues.push(
        ValidationIssue::new(IssueKind::EmptyFile, "The file is completely empty")
          .with_suggestion("Add content to the file or remove it"),
      );
      return result;
    }

    let ctx = RuleContext {
      fs:      &self.fs,
      options: &self.options,
    };
    for rule in &self.rules {
      let found = rule.check(&doc, &ctx);
      trace!("{}: rule {} found {} issues", path.display(), rule.name(), found.len());
      result.issues.extend(found);
    }

    result
  }
}
