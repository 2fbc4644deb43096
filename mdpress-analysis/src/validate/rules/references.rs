use super::{Rule, RuleContext};
use crate::validate::{
  issue::{IssueKind, ValidationIssue},
  source::SourceDocument,
};

/// Broken local links and plain-HTTP links.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkRule;

impl Rule for LinkRule {
  fn name(&self) -> &'static str {
    "links"
  }

  fn check(
    &self,
    doc: &SourceDocument<'_>,
    ctx: &RuleContext<'_>,
  ) -> Vec<ValidationIssue> {
    let base = doc.base_dir();
    let mut issues = Vec::new();

    for link in &doc.links {
      if link.target.starts_with("http://") {
        issues.push(
          ValidationIssue::new(
            IssueKind::UnsafeLink,
            format!("Insecure HTTP link: '{}'", link.label),
          )
          .with_line(link.line)
          .with_suggestion("Consider using HTTPS")
          .with_context(link.target.clone()),
        );
        continue;
      }

      if link.is_external() || !ctx.options.check_broken_links {
        continue;
      }

      let local = link.local_path();
      if local.is_empty() {
        continue;
      }
      let resolved = base.join(local);
      if !ctx.fs.exists(&resolved) {
        log::debug!(
          "{}: link target {} does not exist",
          doc.path.display(),
          resolved.display()
        );
        issues.push(
          ValidationIssue::new(
            IssueKind::BrokenLink,
            format!("Broken link: '{}' -> {}", link.label, link.target),
          )
          .with_line(link.line)
          .with_suggestion("Check that the referenced file exists at the given path")
          .with_context(resolved.display().to_string()),
        );
      }
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

  #[test]
  fn test_missing_link_target() {
    let issues = run_rule(
      &LinkRule,
      "[link](missing.md)\n",
      &MemoryFs::new(),
      &ValidationOptions::default(),
    );
    assert_eq!(codes(&issues), vec!["E004"]);
    assert_eq!(issues[0].line, Some(1));
  }

  #[test]
  fn test_links_resolve_against_document_dir() {
    let fs = MemoryFs::new()
      .with_file("docs/other.md", "# Other")
      .with_file("shared/notes.md", "# Notes");
    let text = "[a](other.md#part) [b](../shared/notes.md?v=2) [c](#local) \
                [d](https://example.org) [e](mailto:a@b.c)\n";
    let issues = run_rule(&LinkRule, text, &fs, &ValidationOptions::default());
    assert!(issues.is_empty(), "{issues:?}");
  }

  #[test]
  fn test_http_link_warns_even_without_link_checks() {
    let options = ValidationOptions {
      check_broken_links: false,
      ..Default::default()
    };
    let text = "[x](http://example.org) [y](gone.md)\n";
    let issues = run_rule(&LinkRule, text, &MemoryFs::new(), &options);
    assert_eq!(codes(&issues), vec!["E017"]);
  }
}
