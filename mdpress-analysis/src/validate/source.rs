//! Pre-scan of raw Markdown shared by all rules.
use std::{
  ops::Range,
  path::{Path, PathBuf},
  sync::LazyLock,
};

use regex::Regex;

use crate::{frontmatter::FrontMatter, utils::never_matching_regex};

static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^(#{1,6})[ \t]+(.*)$").unwrap_or_else(|e| {
    log::error!("Failed to compile HEADING_RE regex: {e}");
    never_matching_regex()
  })
});

static CLOSING_SEQUENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?:^|[ \t]+)#+[ \t]*$").unwrap_or_else(|e| {
    log::error!("Failed to compile CLOSING_SEQUENCE_RE regex: {e}");
    never_matching_regex()
  })
});

static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap_or_else(|e| {
    log::error!("Failed to compile LINK_RE regex: {e}");
    never_matching_regex()
  })
});

static IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"!\[([^\]]*)\]\(([^)]+)\)").unwrap_or_else(|e| {
    log::error!("Failed to compile IMAGE_RE regex: {e}");
    never_matching_regex()
  })
});

/// An ATX heading line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceHeading {
  pub line:  usize,
  pub level: u8,
  pub text:  String,
}

/// An inline link or image reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
  pub line:   usize,
  /// Link text or image alt text.
  pub label:  String,
  /// Destination with any title stripped.
  pub target: String,
}

impl Reference {
  /// Whether the target names something outside the local tree.
  #[must_use]
  pub fn is_external(&self) -> bool {
    has_scheme(&self.target) || self.target.starts_with("//")
  }

  /// Local path part of the target, without fragment or query.
  #[must_use]
  pub fn local_path(&self) -> &str {
    let end = self.target.find(['#', '?']).unwrap_or(self.target.len());
    &self.target[..end]
  }
}

/// A document with its lines classified and references extracted.
#[derive(Debug)]
pub struct SourceDocument<'a> {
  pub path:         &'a Path,
  pub text:         &'a str,
  pub lines:        Vec<&'a str>,
  pub front_matter: Option<FrontMatter<'a>>,
  pub headings:     Vec<SourceHeading>,
  pub links:        Vec<Reference>,
  pub images:       Vec<Reference>,
  /// Per line, whether it holds Markdown prose rather than code or front
  /// matter.
  prose:            Vec<bool>,
}

impl<'a> SourceDocument<'a> {
  #[must_use]
  pub fn scan(path: &'a Path, text: &'a str) -> Self {
    let lines: Vec<&str> = text.lines().collect();
    let front_matter = FrontMatter::extract(text);

    let mut prose = vec![true; lines.len()];
    let body_start = front_matter.map_or(0, |fm| fm.body_line - 1);
    for flag in prose.iter_mut().take(body_start) {
      *flag = false;
    }
    for range in fenced_ranges(&lines, body_start) {
      for flag in &mut prose[range] {
        *flag = false;
      }
    }

    let mut headings = Vec::new();
    let mut links = Vec::new();
    let mut images = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
      if !prose[idx] {
        continue;
      }
      let line_no = idx + 1;

      if let Some(caps) = HEADING_RE.captures(line) {
        #[allow(
          clippy::cast_possible_truncation,
          reason = "At most six markers"
        )]
        let level = caps[1].len() as u8;
        headings.push(SourceHeading {
          line: line_no,
          level,
          text: heading_text(&caps[2]),
        });
      }

      for caps in IMAGE_RE.captures_iter(line) {
        images.push(Reference {
          line:   line_no,
          label:  caps[1].to_string(),
          target: clean_target(&caps[2]),
        });
      }

      for caps in LINK_RE.captures_iter(line) {
        let Some(whole) = caps.get(0) else { continue };
        if line[..whole.start()].ends_with('!') {
          continue;
        }
        links.push(Reference {
          line:   line_no,
          label:  caps[1].to_string(),
          target: clean_target(&caps[2]),
        });
      }
    }

    Self {
      path,
      text,
      lines,
      front_matter,
      headings,
      links,
      images,
      prose,
    }
  }

  /// Whether line `idx` (0-based) is Markdown prose.
  #[must_use]
  pub fn is_prose(&self, idx: usize) -> bool {
    self.prose.get(idx).copied().unwrap_or(false)
  }

  /// Directory that relative references resolve against.
  #[must_use]
  pub fn base_dir(&self) -> PathBuf {
    self
      .path
      .parent()
      .map_or_else(PathBuf::new, Path::to_path_buf)
  }

  /// Whether the document is empty or whitespace only.
  #[must_use]
  pub fn is_blank(&self) -> bool {
    self.text.trim().is_empty()
  }
}

/// Line ranges covered by fenced code blocks, fences included. An unclosed
/// fence runs to the end of the document.
fn fenced_ranges(lines: &[&str], start: usize) -> Vec<Range<usize>> {
  let mut ranges = Vec::new();
  let mut open: Option<(usize, char, usize)> = None;

  for (idx, line) in lines.iter().enumerate().skip(start) {
    let indent = line.len() - line.trim_start_matches(' ').len();
    if indent > 3 {
      continue;
    }
    let trimmed = &line[indent..];
    let Some(marker) = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')
    else {
      continue;
    };
    let run = trimmed.chars().take_while(|c| *c == marker).count();
    if run < 3 {
      continue;
    }

    match open {
      None => open = Some((idx, marker, run)),
      Some((begin, open_marker, open_run))
        if marker == open_marker
          && run >= open_run
          && trimmed[run..].trim().is_empty() =>
      {
        ranges.push(begin..idx + 1);
        open = None;
      },
      Some(_) => {},
    }
  }

  if let Some((begin, ..)) = open {
    ranges.push(begin..lines.len());
  }
  ranges
}

/// Heading content without the optional closing `#` sequence.
fn heading_text(content: &str) -> String {
  CLOSING_SEQUENCE_RE.replace(content, "").trim().to_string()
}

fn clean_target(raw: &str) -> String {
  let raw = raw.trim();
  if let Some(rest) = raw.strip_prefix('<')
    && let Some(end) = rest.find('>')
  {
    return rest[..end].to_string();
  }
  raw.split_whitespace().next().unwrap_or_default().to_string()
}

fn has_scheme(target: &str) -> bool {
  let Some(colon) = target.find(':') else {
    return false;
  };
  let scheme = &target[..colon];
  scheme.len() > 1
    && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
    && scheme
      .chars()
      .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn scan(text: &str) -> SourceDocument<'_> {
    SourceDocument::scan(Path::new("docs/guide.md"), text)
  }

  #[test]
  fn test_headings_outside_fences() {
    let doc = scan("# One\n```sh\n# not a heading\n```\n## Two ##\n#nospace\n");
    let levels: Vec<_> = doc.headings.iter().map(|h| (h.line, h.level)).collect();
    assert_eq!(levels, vec![(1, 1), (5, 2)]);
    assert!(!doc.is_prose(2));
    assert!(doc.is_prose(4));
  }

  #[test]
  fn test_closing_sequence_is_not_heading_text() {
    let doc = scan("## Setup ##\n## Setup\n### C# tips\n# #\n## Tabs\t#\t\n");
    let texts: Vec<_> = doc.headings.iter().map(|h| h.text.as_str()).collect();
    assert_eq!(texts, vec!["Setup", "Setup", "C# tips", "", "Tabs"]);
  }

  #[test]
  fn test_unclosed_fence_runs_to_end() {
    let doc = scan("~~~~\n# hidden\n~~~\n# still hidden\n");
    assert!(doc.headings.is_empty());
  }

  #[test]
  fn test_links_exclude_images() {
    let doc = scan("See [a](a.md) and ![pic](img/p.png \"Title\").\n");
    assert_eq!(doc.links.len(), 1);
    assert_eq!(doc.links[0].target, "a.md");
    assert_eq!(doc.images.len(), 1);
    assert_eq!(doc.images[0].target, "img/p.png");
    assert_eq!(doc.images[0].label, "pic");
  }

  #[test]
  fn test_front_matter_lines_are_not_prose() {
    let doc = scan("---\ntitle: x\n---\n# Body\n");
    assert!(doc.front_matter.is_some());
    assert!(!doc.is_prose(1));
    assert!(!doc.is_prose(2));
    assert!(doc.is_prose(3));
    assert_eq!(doc.headings[0].line, 4);
  }

  #[test]
  fn test_reference_targets() {
    let reference = |target: &str| {
      Reference {
        line:   1,
        label:  String::new(),
        target: target.to_string(),
      }
    };
    assert!(reference("https://x.org").is_external());
    assert!(reference("mailto:a@b.c").is_external());
    assert!(!reference("c:notes.md").is_external());
    assert!(!reference("notes.md#intro").is_external());
    assert_eq!(reference("notes.md#intro").local_path(), "notes.md");
    assert_eq!(reference("notes.md?x=1").local_path(), "notes.md");
    assert_eq!(reference("#intro").local_path(), "");
  }

  #[test]
  fn test_angle_bracket_target() {
    assert_eq!(clean_target("<my file.md>"), "my file.md");
  }
}
