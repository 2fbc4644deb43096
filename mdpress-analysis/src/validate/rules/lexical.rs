use std::sync::LazyLock;

use regex::Regex;

use super::{Rule, RuleContext};
use crate::{
  utils::{excerpt, never_matching_regex},
  validate::{
    issue::{IssueKind, ValidationIssue},
    source::SourceDocument,
  },
};

static NUMBERED_NO_SPACE_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^\d+\.[^\s\d]").unwrap_or_else(|e| {
    log::error!("Failed to compile NUMBERED_NO_SPACE_RE regex: {e}");
    never_matching_regex()
  })
});

/// Whether `c` falls in one of the common emoji blocks.
#[must_use]
pub const fn is_emoji(c: char) -> bool {
  matches!(
    c,
    '\u{1F600}'..='\u{1F64F}'
      | '\u{1F300}'..='\u{1F5FF}'
      | '\u{1F680}'..='\u{1F6FF}'
      | '\u{1F1E0}'..='\u{1F1FF}'
      | '\u{2600}'..='\u{27BF}'
  )
}

/// Long lines, tabs and non-ASCII characters outside the allow-list.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineStyleRule;

impl Rule for LineStyleRule {
  fn name(&self) -> &'static str {
    "line-style"
  }

  fn check(
    &self,
    doc: &SourceDocument<'_>,
    ctx: &RuleContext<'_>,
  ) -> Vec<ValidationIssue> {
    let options = ctx.options;
    let mut issues = Vec::new();

    for (idx, line) in doc.lines.iter().enumerate() {
      let line_no = idx + 1;

      let length = line.chars().count();
      if length > options.max_line_length {
        issues.push(
          ValidationIssue::new(
            IssueKind::LineTooLong,
            format!("Line {line_no} is too long ({length} characters)"),
          )
          .with_line(line_no)
          .with_suggestion("Consider splitting the line for readability")
          .with_context(format!("Line: {}", excerpt(line, 50))),
        );
      }

      if line.contains('\t') {
        issues.push(
          ValidationIssue::new(
            IssueKind::TabCharacters,
            format!("Line {line_no} contains tab characters"),
          )
          .with_line(line_no)
          .with_suggestion("Replace tabs with spaces for better compatibility"),
        );
      }

      let mut unusual: Vec<char> = Vec::new();
      for c in line.chars() {
        if !c.is_ascii()
          && !options.allowed_non_ascii.contains(c)
          && !unusual.contains(&c)
        {
          unusual.push(c);
        }
      }
      if !unusual.is_empty() {
        issues.push(
          ValidationIssue::new(
            IssueKind::InvalidCharacters,
            format!("Line {line_no} contains potentially problematic characters"),
          )
          .with_line(line_no)
          .with_suggestion("Review and correct the special characters")
          .with_context(format!(
            "Characters: {}",
            unusual.into_iter().collect::<String>()
          )),
        );
      }
    }

    issues
  }
}

/// Emoji overuse and emoji in headings.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmojiRule;

impl Rule for EmojiRule {
  fn name(&self) -> &'static str {
    "emoji"
  }

  fn check(
    &self,
    doc: &SourceDocument<'_>,
    ctx: &RuleContext<'_>,
  ) -> Vec<ValidationIssue> {
    let count = doc.text.chars().filter(|c| is_emoji(*c)).count();
    if count == 0 {
      return Vec::new();
    }

    let mut issues = Vec::new();
    if count > ctx.options.max_emojis {
      issues.push(
        ValidationIssue::new(
          IssueKind::TooManyEmojis,
          format!("Too many emoji found ({count})"),
        )
        .with_suggestion("Consider using fewer emoji for a more professional tone")
        .with_context(format!("Limit: {}", ctx.options.max_emojis)),
      );
    }

    for heading in &doc.headings {
      if heading.text.chars().any(is_emoji) {
        issues.push(
          ValidationIssue::new(
            IssueKind::EmojiInTitle,
            format!("Emoji found in heading (line {})", heading.line),
          )
          .with_line(heading.line)
          .with_suggestion("Emoji in headings can cause problems in some systems"),
        );
      }
    }

    issues
  }
}

/// List markers glued to their item text.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListMarkerRule;

impl ListMarkerRule {
  fn bullet_without_space(line: &str) -> bool {
    let mut chars = line.chars();
    let Some(marker) = chars.next().filter(|c| matches!(c, '-' | '*' | '+'))
    else {
      return false;
    };
    let Some(next) = chars.next() else {
      return false;
    };
    if next.is_whitespace() || next == marker {
      return false;
    }
    // `*word*` is emphasis, not a list item
    !(marker == '*' && line[1..].contains('*'))
  }
}

impl Rule for ListMarkerRule {
  fn name(&self) -> &'static str {
    "list-markers"
  }

  fn check(
    &self,
    doc: &SourceDocument<'_>,
    _ctx: &RuleContext<'_>,
  ) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for (idx, line) in doc.lines.iter().enumerate() {
      if !doc.is_prose(idx) {
        continue;
      }
      let line_no = idx + 1;
      let stripped = line.trim();

      if Self::bullet_without_space(stripped) {
        issues.push(
          ValidationIssue::new(
            IssueKind::ListNoSpace,
            format!("List item without a space after the marker (line {line_no})"),
          )
          .with_line(line_no)
          .with_suggestion("Add a space after the list marker: '- ' instead of '-'"),
        );
      }

      if NUMBERED_NO_SPACE_RE.is_match(stripped) {
        issues.push(
          ValidationIssue::new(
            IssueKind::NumberedListNoSpace,
            format!("Numbered list item without a space after the dot (line {line_no})"),
          )
          .with_line(line_no)
          .with_suggestion("Add a space after the dot: '1. ' instead of '1.'"),
        );
      }
    }

    issues
  }
}
