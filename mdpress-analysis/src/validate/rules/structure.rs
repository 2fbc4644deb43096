use std::collections::HashMap;

use super::{Rule, RuleContext};
use crate::validate::{
  issue::{IssueKind, ValidationIssue},
  source::SourceDocument,
};

/// Characters that break file names, anchors or exported bookmarks when
/// used in a heading.
const RESERVED_TITLE_CHARS: [char; 11] =
  ['<', '>', '&', '"', '\'', '|', '\\', '/', ':', '*', '?'];

/// Missing headings, skipped levels and duplicate heading text.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadingStructureRule;

impl Rule for HeadingStructureRule {
  fn name(&self) -> &'static str {
    "heading-structure"
  }

  fn check(
    &self,
    doc: &SourceDocument<'_>,
    _ctx: &RuleContext<'_>,
  ) -> Vec<ValidationIssue> {
    if doc.headings.is_empty() {
      return vec![
        ValidationIssue::new(
          IssueKind::NoHeadings,
          "No headings found in the document",
        )
        .with_suggestion("Add headings with # for H1, ## for H2 and so on"),
      ];
    }

    let mut issues = Vec::new();

    for pair in doc.headings.windows(2) {
      let (prev, next) = (&pair[0], &pair[1]);
      if next.level > prev.level + 1 {
        issues.push(
          ValidationIssue::new(
            IssueKind::InconsistentHeadings,
            format!("Heading level jumps from H{} to H{}", prev.level, next.level),
          )
          .with_line(next.line)
          .with_suggestion("Use a consistent hierarchy (H1, H2, H3) without skipping levels")
          .with_context(format!("H{} -> H{}", prev.level, next.level)),
        );
      }
    }

    let mut order: Vec<&str> = Vec::new();
    let mut seen: HashMap<&str, Vec<usize>> = HashMap::new();
    for heading in &doc.headings {
      if heading.text.is_empty() {
        continue;
      }
      let lines = seen.entry(heading.text.as_str()).or_default();
      if lines.is_empty() {
        order.push(heading.text.as_str());
      }
      lines.push(heading.line);
    }

    for text in order {
      let Some(lines) = seen.get(text) else { continue };
      if lines.len() < 2 {
        continue;
      }
      let listed = lines
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
      issues.push(
        ValidationIssue::new(
          IssueKind::DuplicateHeadings,
          format!("Duplicate heading: '{text}'"),
        )
        .with_line(lines[1])
        .with_suggestion("Use unique headings or add a distinguishing suffix")
        .with_context(format!("Appears on lines: {listed}")),
      );
    }

    issues
  }
}

/// Reserved characters in heading text.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadingCharactersRule;

impl Rule for HeadingCharactersRule {
  fn name(&self) -> &'static str {
    "heading-characters"
  }

  fn check(
    &self,
    doc: &SourceDocument<'_>,
    _ctx: &RuleContext<'_>,
  ) -> Vec<ValidationIssue> {
    doc
      .headings
      .iter()
      .filter_map(|heading| {
        let found: Vec<String> = RESERVED_TITLE_CHARS
          .iter()
          .filter(|c| heading.text.contains(**c))
          .map(ToString::to_string)
          .collect();
        (!found.is_empty()).then(|| {
          ValidationIssue::new(
            IssueKind::ProblematicTitleChars,
            format!(
              "Problematic characters in heading (line {}): {}",
              heading.line,
              found.join(", ")
            ),
          )
          .with_line(heading.line)
          .with_suggestion("Avoid special characters in headings for better compatibility")
        })
      })
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::{
    super::test_support::{codes, run_rule},
    *,
  };
  use crate::validate::{ValidationOptions, fs::MemoryFs};

  fn check(rule: &dyn Rule, text: &str) -> Vec<ValidationIssue> {
    run_rule(rule, text, &MemoryFs::new(), &ValidationOptions::default())
  }

  #[test]
  fn test_no_headings() {
    let issues = check(&HeadingStructureRule, "just text\n");
    assert_eq!(codes(&issues), vec!["E014"]);
  }

  #[test]
  fn test_each_jump_is_reported() {
    let issues = check(&HeadingStructureRule, "# A\n### B\n# C\n#### D\n");
    assert_eq!(codes(&issues), vec!["E015", "E015"]);
    assert_eq!(issues[0].line, Some(2));
    assert_eq!(issues[0].context.as_deref(), Some("H1 -> H3"));
    assert_eq!(issues[1].context.as_deref(), Some("H1 -> H4"));
  }

  #[test]
  fn test_first_heading_may_start_deep() {
    let issues = check(&HeadingStructureRule, "### Deep start\n#### Next\n");
    assert!(issues.is_empty());
  }

  #[test]
  fn test_duplicates_listed_once() {
    let issues = check(
      &HeadingStructureRule,
      "# Guide\n## Setup\ntext\n## Setup\n## Other\n",
    );
    assert_eq!(codes(&issues), vec!["E018"]);
    assert_eq!(issues[0].context.as_deref(), Some("Appears on lines: 2, 4"));
  }

  #[test]
  fn test_closed_heading_duplicates_open_one() {
    let issues = check(&HeadingStructureRule, "# Guide\n## Setup ##\n## Setup\n");
    assert_eq!(codes(&issues), vec!["E018"]);
    assert_eq!(issues[0].message, "Duplicate heading: 'Setup'");
  }

  #[test]
  fn test_reserved_heading_characters() {
    let issues = check(&HeadingCharactersRule, "# Q&A: what?\n## Plain\n");
    assert_eq!(codes(&issues), vec!["E023"]);
    assert!(issues[0].message.ends_with("&, :, ?"));
  }
}
