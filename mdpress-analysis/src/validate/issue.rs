//! Validation issue types.
use std::fmt;

use serde::{Deserialize, Serialize};

/// How serious an issue is. Only [`Severity::Error`] makes a document
/// invalid.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
  Error,
  Warning,
  Info,
}

impl Severity {
  pub const ALL: [Self; 3] = [Self::Error, Self::Warning, Self::Info];

  #[must_use]
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::Error => "error",
      Self::Warning => "warning",
      Self::Info => "info",
    }
  }
}

impl fmt::Display for Severity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Every defect the validator knows how to report.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
  FileNotFound,
  FileTooLarge,
  EmptyFile,
  BrokenLink,
  MissingImage,
  UnsupportedFormat,
  LineTooLong,
  TabCharacters,
  InvalidDate,
  MissingMetadata,
  InvalidYaml,
  NoHeadings,
  InconsistentHeadings,
  LargeImage,
  UnsafeLink,
  DuplicateHeadings,
  MissingAltText,
  InvalidCharacters,
  TooManyEmojis,
  EmojiInTitle,
  ProblematicTitleChars,
  ListNoSpace,
  NumberedListNoSpace,
  SvgInvalid,
  SvgNoViewbox,
  SvgTooLarge,
  SvgReadError,
  NoMetadata,
  ValidationError,
}

impl IssueKind {
  /// Stable diagnostic code.
  #[must_use]
  pub const fn code(self) -> &'static str {
    match self {
      Self::FileNotFound => "E001",
      Self::FileTooLarge => "E002",
      Self::EmptyFile => "E003",
      Self::BrokenLink => "E004",
      Self::MissingImage => "E005",
      Self::UnsupportedFormat => "E006",
      Self::LineTooLong => "E009",
      Self::TabCharacters => "E010",
      Self::InvalidDate => "E011",
      Self::MissingMetadata => "E012",
      Self::InvalidYaml => "E013",
      Self::NoHeadings => "E014",
      Self::InconsistentHeadings => "E015",
      Self::LargeImage => "E016",
      Self::UnsafeLink => "E017",
      Self::DuplicateHeadings => "E018",
      Self::MissingAltText => "E019",
      Self::InvalidCharacters => "E020",
      Self::TooManyEmojis => "E021",
      Self::EmojiInTitle => "E022",
      Self::ProblematicTitleChars => "E023",
      Self::ListNoSpace => "E024",
      Self::NumberedListNoSpace => "E025",
      Self::SvgInvalid => "E026",
      Self::SvgNoViewbox => "E027",
      Self::SvgTooLarge => "E028",
      Self::SvgReadError => "E029",
      Self::NoMetadata => "I001",
      Self::ValidationError => "E999",
    }
  }

  /// Severity an issue of this kind is reported with.
  #[must_use]
  pub const fn severity(self) -> Severity {
    match self {
      Self::FileNotFound
      | Self::EmptyFile
      | Self::BrokenLink
      | Self::MissingImage
      | Self::InvalidYaml
      | Self::SvgInvalid
      | Self::SvgReadError
      | Self::ValidationError => Severity::Error,
      Self::MissingMetadata | Self::EmojiInTitle | Self::NoMetadata => {
        Severity::Info
      },
      _ => Severity::Warning,
    }
  }

  /// Snake case name, as serialized.
  #[must_use]
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::FileNotFound => "file_not_found",
      Self::FileTooLarge => "file_too_large",
      Self::EmptyFile => "empty_file",
      Self::BrokenLink => "broken_link",
      Self::MissingImage => "missing_image",
      Self::UnsupportedFormat => "unsupported_format",
      Self::LineTooLong => "line_too_long",
      Self::TabCharacters => "tab_characters",
      Self::InvalidDate => "invalid_date",
      Self::MissingMetadata => "missing_metadata",
      Self::InvalidYaml => "invalid_yaml",
      Self::NoHeadings => "no_headings",
      Self::InconsistentHeadings => "inconsistent_headings",
      Self::LargeImage => "large_image",
      Self::UnsafeLink => "unsafe_link",
      Self::DuplicateHeadings => "duplicate_headings",
      Self::MissingAltText => "missing_alt_text",
      Self::InvalidCharacters => "invalid_characters",
      Self::TooManyEmojis => "too_many_emojis",
      Self::EmojiInTitle => "emoji_in_title",
      Self::ProblematicTitleChars => "problematic_title_chars",
      Self::ListNoSpace => "list_no_space",
      Self::NumberedListNoSpace => "numbered_list_no_space",
      Self::SvgInvalid => "svg_invalid",
      Self::SvgNoViewbox => "svg_no_viewbox",
      Self::SvgTooLarge => "svg_too_large",
      Self::SvgReadError => "svg_read_error",
      Self::NoMetadata => "no_metadata",
      Self::ValidationError => "validation_error",
    }
  }
}

impl fmt::Display for IssueKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A single finding against one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
  pub kind:       IssueKind,
  pub severity:   Severity,
  pub code:       String,
  pub message:    String,
  pub line:       Option<usize>,
  pub suggestion: String,
  pub context:    Option<String>,
}

impl ValidationIssue {
  /// Create an issue with the kind's code and severity.
  #[must_use]
  pub fn new(kind: IssueKind, message: impl Into<String>) -> Self {
    Self {
      kind,
      severity: kind.severity(),
      code: kind.code().to_string(),
      message: message.into(),
      line: None,
      suggestion: String::new(),
      context: None,
    }
  }

  #[must_use]
  pub const fn with_line(mut self, line: usize) -> Self {
    self.line = Some(line);
    self
  }

  #[must_use]
  pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
    self.suggestion = suggestion.into();
    self
  }

  #[must_use]
  pub fn with_context(mut self, context: impl Into<String>) -> Self {
    self.context = Some(context.into());
    self
  }

  #[must_use]
  pub fn is_error(&self) -> bool {
    self.severity == Severity::Error
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]
  use super::*;

  #[test]
  fn test_new_takes_code_and_severity_from_kind() {
    let issue = ValidationIssue::new(IssueKind::BrokenLink, "broken")
      .with_line(3)
      .with_suggestion("fix it");
    assert_eq!(issue.code, "E004");
    assert_eq!(issue.severity, Severity::Error);
    assert_eq!(issue.line, Some(3));
    assert!(issue.context.is_none());
  }

  #[test]
  fn test_as_str_matches_serde() {
    for kind in [
      IssueKind::NoMetadata,
      IssueKind::ProblematicTitleChars,
      IssueKind::SvgNoViewbox,
    ] {
      let json = serde_json::to_string(&kind).unwrap();
      assert_eq!(json, format!("\"{}\"", kind.as_str()));
    }
  }

  #[test]
  fn test_serialized_shape() {
    let issue = ValidationIssue::new(IssueKind::NoMetadata, "none");
    let value = serde_json::to_value(&issue).unwrap();
    assert_eq!(value["kind"], "no_metadata");
    assert_eq!(value["severity"], "info");
    assert_eq!(value["code"], "I001");
    assert!(value["line"].is_null());
  }
}
