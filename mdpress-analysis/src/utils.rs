use std::path::{Path, PathBuf};

use log::trace;
use walkdir::WalkDir;

/// Slugify a heading title for use as an anchor ID.
///
/// Lowercases the text, turns whitespace into dashes and drops every other
/// character outside `[a-z0-9-]`. No percent-encoding or Unicode
/// normalization takes place, so accented letters are removed rather than
/// transliterated.
#[must_use]
pub fn slugify(text: &str) -> String {
  let mut slug = String::with_capacity(text.len());
  for c in text.chars().flat_map(char::to_lowercase) {
    if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
      slug.push(c);
    } else if c.is_whitespace() {
      slug.push('-');
    }
  }
  slug
}

/// Collect all markdown files under `input_dir`, sorted for deterministic
/// processing order.
#[must_use]
pub fn collect_markdown_files(input_dir: &Path) -> Vec<PathBuf> {
  let mut files = Vec::with_capacity(100);

  for entry in WalkDir::new(input_dir)
    .follow_links(true)
    .into_iter()
    .filter_map(Result::ok)
  {
    let path = entry.path();
    if path.is_file() && path.extension().is_some_and(|ext| ext == "md") {
      files.push(path.to_owned());
    }
  }

  files.sort();
  trace!("Found {} markdown files to process", files.len());
  files
}

/// Create a regex that never matches anything.
///
/// Used as a fallback when a static pattern fails to compile, so that a bad
/// pattern disables one check instead of aborting the whole run.
///
/// # Panics
///
/// Panics if the fallback regex pattern `r"^\b$"` fails to compile, which
/// should never happen.
#[must_use]
pub fn never_matching_regex() -> regex::Regex {
  regex::Regex::new(r"[^\s\S]").unwrap_or_else(|_| {
    #[allow(clippy::unwrap_used, reason = "Constant pattern")]
    regex::Regex::new(r"^\b$").unwrap()
  })
}

/// Truncate `line` to at most `max` characters, appending an ellipsis when
/// anything was cut.
#[must_use]
pub fn excerpt(line: &str, max: usize) -> String {
  if line.chars().count() <= max {
    return line.to_string();
  }
  let mut out: String = line.chars().take(max).collect();
  out.push_str("...");
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_slugify_basic() {
    assert_eq!(slugify("Hello World"), "hello-world");
    assert_eq!(slugify("Hello, World!"), "hello-world");
    assert_eq!(slugify("Section 1.2: Setup"), "section-12-setup");
  }

  #[test]
  fn test_slugify_drops_non_ascii() {
    assert_eq!(slugify("Café au lait"), "caf-au-lait");
    assert_eq!(slugify("🚀 Launch"), "-launch");
    assert_eq!(slugify("日本語"), "");
  }

  #[test]
  fn test_slugify_keeps_repeated_whitespace() {
    assert_eq!(slugify("a  b"), "a--b");
    assert_eq!(slugify("tab\there"), "tab-here");
  }

  #[test]
  fn test_slugify_idempotent_on_slugs() {
    for input in ["intro", "getting-started", "b1", "a--b", "-x-", ""] {
      assert_eq!(slugify(input), input);
      assert_eq!(slugify(&slugify(input)), slugify(input));
    }
  }

  #[test]
  fn test_slugify_total_on_arbitrary_unicode() {
    let samples = [
      "\u{0}\u{1}\u{7f}",
      "ÀÉÎÕÜ ß ﬁ",
      "\u{202e}rtl\u{202c}",
      "emoji 👩‍👩‍👧 zwj",
      "İstanbul",
    ];
    for sample in samples {
      let slug = slugify(sample);
      assert!(
        slug
          .chars()
          .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'),
        "unexpected characters in {slug:?}"
      );
    }
  }

  #[test]
  fn test_excerpt() {
    assert_eq!(excerpt("short", 10), "short");
    assert_eq!(excerpt("abcdef", 3), "abc...");
    assert_eq!(excerpt("ñññññ", 2), "ññ...");
  }

  #[test]
  fn test_never_matching_regex() {
    let re = never_matching_regex();
    assert!(!re.is_match(""));
    assert!(!re.is_match("anything"));
  }
}
