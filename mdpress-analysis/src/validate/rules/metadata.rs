use std::sync::LazyLock;

use jiff::civil::Date;
use regex::Regex;
use serde_yaml::Value;

use super::{Rule, RuleContext};
use crate::{
  utils::never_matching_regex,
  validate::{
    issue::{IssueKind, ValidationIssue},
    source::SourceDocument,
  },
};

/// Front matter fields every document should carry.
pub const RECOMMENDED_FIELDS: [&str; 4] = ["title", "author", "date", "description"];

static DATE_SHAPE_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap_or_else(|e| {
    log::error!("Failed to compile DATE_SHAPE_RE regex: {e}");
    never_matching_regex()
  })
});

/// Strict `YYYY-MM-DD` calendar date.
fn is_valid_date(value: &str) -> bool {
  DATE_SHAPE_RE.is_match(value) && Date::strptime("%Y-%m-%d", value).is_ok()
}

/// Front matter presence, syntax, recommended fields and date format.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataRule;

impl Rule for MetadataRule {
  fn name(&self) -> &'static str {
    "metadata"
  }

  fn check(
    &self,
    doc: &SourceDocument<'_>,
    _ctx: &RuleContext<'_>,
  ) -> Vec<ValidationIssue> {
    let Some(front) = doc.front_matter else {
      return vec![
        ValidationIssue::new(IssueKind::NoMetadata, "No YAML metadata found")
          .with_suggestion("Consider adding front matter to document the file"),
      ];
    };

    let metadata = match front.parse() {
      Ok(metadata) => metadata,
      Err(e) => {
        return vec![
          ValidationIssue::new(IssueKind::InvalidYaml, format!("Invalid YAML metadata: {e}"))
            .with_line(1)
            .with_suggestion("Check the YAML syntax of the front matter"),
        ];
      },
    };

    let mut issues: Vec<ValidationIssue> = RECOMMENDED_FIELDS
      .iter()
      .filter(|field| !metadata.contains_key(**field))
      .map(|field| {
        ValidationIssue::new(
          IssueKind::MissingMetadata,
          format!("Recommended metadata field missing: {field}"),
        )
        .with_suggestion(format!("Add '{field}' to the front matter"))
      })
      .collect();

    if let Some(Value::String(date)) = metadata.get("date")
      && !is_valid_date(date)
    {
      issues.push(
        ValidationIssue::new(
          IssueKind::InvalidDate,
          format!("Invalid date format: {date}"),
        )
        .with_suggestion("Use the YYYY-MM-DD format, for example 2024-12-19"),
      );
    }

    issues
  }
}

#[cfg(test)]
mod tests {
  use super::{
    super::test_support::{codes, run_rule},
    *,
  };
  use crate::validate::{ValidationOptions, fs::MemoryFs};

  fn check(text: &str) -> Vec<ValidationIssue> {
    run_rule(&MetadataRule, text, &MemoryFs::new(), &ValidationOptions::default())
  }

  #[test]
  fn test_no_metadata_is_info() {
    assert_eq!(codes(&check("# Title\n")), vec!["I001"]);
  }

  #[test]
  fn test_complete_metadata() {
    let text = "---\ntitle: T\nauthor: A\ndate: 2024-12-19\ndescription: D\n---\n# T\n";
    assert!(check(text).is_empty());
  }

  #[test]
  fn test_missing_fields_and_bad_date() {
    let text = "---\ntitle: T\ndate: 19/12/2024\n---\n";
    assert_eq!(codes(&check(text)), vec!["E012", "E012", "E011"]);
  }

  #[test]
  fn test_impossible_date() {
    let text = "---\ntitle: T\nauthor: A\ndate: 2024-02-30\ndescription: D\n---\n";
    assert_eq!(codes(&check(text)), vec!["E011"]);
  }

  #[test]
  fn test_invalid_yaml_stops_there() {
    assert_eq!(codes(&check("---\ntitle: [oops\n---\n")), vec!["E013"]);
    assert_eq!(codes(&check("---\njust a string\n---\n")), vec!["E013"]);
  }

  #[test]
  fn test_date_validation() {
    assert!(is_valid_date("2024-01-31"));
    assert!(!is_valid_date("2024-1-31"));
    assert!(!is_valid_date("2024-13-01"));
    assert!(!is_valid_date(" 2024-01-31"));
  }
}
