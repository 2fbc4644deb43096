//! Aggregation of validation results and report rendering.
use std::{collections::BTreeMap, fmt::Write, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
  error::Result,
  validate::{IssueKind, Severity, ValidationResult},
};

const RULE: &str =
  "============================================================";

/// Totals of document content across a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentStats {
  pub total_headings:      usize,
  pub total_links:         usize,
  pub total_images:        usize,
  pub files_with_metadata: usize,
}

/// Commutative fold over validation results.
///
/// Adding results in any order, or merging partial summaries in any
/// grouping, yields the same value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
  pub total_files:        usize,
  pub valid_files:        usize,
  pub invalid_files:      usize,
  pub total_issues:       usize,
  pub issues_by_kind:     BTreeMap<IssueKind, usize>,
  pub issues_by_severity: BTreeMap<Severity, usize>,
  pub content_stats:      ContentStats,
}

impl Default for Summary {
  fn default() -> Self {
    Self {
      total_files:        0,
      valid_files:        0,
      invalid_files:      0,
      total_issues:       0,
      issues_by_kind:     BTreeMap::new(),
      issues_by_severity: Severity::ALL.into_iter().map(|s| (s, 0)).collect(),
      content_stats:      ContentStats::default(),
    }
  }
}

impl Summary {
  #[must_use]
  pub fn from_results<'a>(
    results: impl IntoIterator<Item = &'a ValidationResult>,
  ) -> Self {
    let mut summary = Self::default();
    for result in results {
      summary.add(result);
    }
    summary
  }

  /// Fold one result into the summary.
  pub fn add(&mut self, result: &ValidationResult) {
    self.total_files += 1;
    if result.is_valid() {
      self.valid_files += 1;
    } else {
      self.invalid_files += 1;
    }
    self.total_issues += result.issues.len();
    for issue in &result.issues {
      *self.issues_by_kind.entry(issue.kind).or_default() += 1;
      *self.issues_by_severity.entry(issue.severity).or_default() += 1;
    }

    let stats = &mut self.content_stats;
    stats.total_headings += result.heading_count;
    stats.total_links += result.link_count;
    stats.total_images += result.image_count;
    stats.files_with_metadata += usize::from(result.has_metadata);
  }

  /// Combine two partial summaries.
  pub fn merge(&mut self, other: &Self) {
    self.total_files += other.total_files;
    self.valid_files += other.valid_files;
    self.invalid_files += other.invalid_files;
    self.total_issues += other.total_issues;
    for (kind, count) in &other.issues_by_kind {
      *self.issues_by_kind.entry(*kind).or_default() += count;
    }
    for (severity, count) in &other.issues_by_severity {
      *self.issues_by_severity.entry(*severity).or_default() += count;
    }

    let stats = &mut self.content_stats;
    stats.total_headings += other.content_stats.total_headings;
    stats.total_links += other.content_stats.total_links;
    stats.total_images += other.content_stats.total_images;
    stats.files_with_metadata += other.content_stats.files_with_metadata;
  }

  #[must_use]
  pub fn severity_count(&self, severity: Severity) -> usize {
    self.issues_by_severity.get(&severity).copied().unwrap_or(0)
  }

  /// Follow-up advice derived from the totals.
  #[must_use]
  pub fn recommendations(&self) -> Vec<&'static str> {
    let mut out = Vec::new();
    if self.invalid_files > 0 {
      out.push("Fix the errors before converting");
    }
    if self.severity_count(Severity::Warning) > 0 {
      out.push("Review the warnings to improve quality");
    }
    if self.content_stats.files_with_metadata < self.total_files {
      out.push("Consider adding metadata to every file");
    }
    if self.content_stats.total_headings == 0 {
      out.push("Add headings for a better document structure");
    }
    out
  }
}

/// Render a human readable report.
#[must_use]
pub fn render_text_report(
  results: &BTreeMap<PathBuf, ValidationResult>,
  verbose: bool,
) -> String {
  let summary = Summary::from_results(results.values());
  let mut out = String::new();

  // Writing to String is infallible
  let _ = writeln!(out, "\n{RULE}\nMARKDOWN VALIDATION REPORT\n{RULE}");

  let _ = writeln!(out, "\nSummary:");
  let _ = writeln!(out, "  Files analyzed:   {}", summary.total_files);
  let _ = writeln!(out, "  Valid files:      {}", summary.valid_files);
  let _ = writeln!(out, "  Files with errors: {}", summary.invalid_files);
  let _ = writeln!(out, "  Total issues:     {}", summary.total_issues);

  let stats = &summary.content_stats;
  let _ = writeln!(out, "\nContent statistics:");
  let _ = writeln!(out, "  Headings:            {}", stats.total_headings);
  let _ = writeln!(out, "  Links:               {}", stats.total_links);
  let _ = writeln!(out, "  Images:              {}", stats.total_images);
  let _ = writeln!(out, "  Files with metadata: {}", stats.files_with_metadata);

  let severity_lines = [
    (Severity::Error, "Errors"),
    (Severity::Warning, "Warnings"),
    (Severity::Info, "Suggestions"),
  ];
  let mut wrote_heading = false;
  for (severity, label) in severity_lines {
    let count = summary.severity_count(severity);
    if count > 0 {
      if !wrote_heading {
        out.push('\n');
        wrote_heading = true;
      }
      let _ = writeln!(out, "{label}: {count}");
    }
  }

  if verbose {
    let _ = writeln!(out, "\nDetails by file:");
    for (path, result) in results {
      let name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
      let status = if result.is_valid() { "VALID" } else { "HAS ERRORS" };
      let _ = writeln!(out, "\n  {name} - {status}");

      for issue in &result.issues {
        let _ = writeln!(
          out,
          "    [{}] {} {}",
          issue.severity, issue.code, issue.message
        );
        if !issue.suggestion.is_empty() {
          let _ = writeln!(out, "      hint: {}", issue.suggestion);
        }
        if let Some(context) = &issue.context {
          let _ = writeln!(out, "      context: {context}");
        }
        if let Some(line) = issue.line {
          let _ = writeln!(out, "      line: {line}");
        }
      }
    }
  }

  let _ = writeln!(out, "\nRecommendations:");
  for recommendation in summary.recommendations() {
    let _ = writeln!(out, "  - {recommendation}");
  }

  let _ = writeln!(out, "\n{RULE}");
  out
}

#[derive(Serialize)]
struct FileReport<'a> {
  valid:  bool,
  #[serde(flatten)]
  result: &'a ValidationResult,
}

#[derive(Serialize)]
struct JsonReport<'a> {
  summary: Summary,
  files:   Vec<FileReport<'a>>,
}

/// Render the summary and every result as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_json_report(
  results: &BTreeMap<PathBuf, ValidationResult>,
) -> Result<String> {
  let report = JsonReport {
    summary: Summary::from_results(results.values()),
    files:   results
      .values()
      .map(|result| {
        FileReport {
          valid: result.is_valid(),
          result,
        }
      })
      .collect(),
  };
  Ok(serde_json::to_string_pretty(&report)?)
}
