//! Leading YAML front matter.
use serde_yaml::{Mapping, Value};

use crate::error::{AnalysisError, Result};

const DELIMITER: &str = "---";

/// A `---` delimited block at the very start of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontMatter<'a> {
  /// YAML between the delimiters, without them.
  pub raw:       &'a str,
  /// Document text after the closing delimiter.
  pub body:      &'a str,
  /// 1-based line number of the first body line.
  pub body_line: usize,
}

impl<'a> FrontMatter<'a> {
  /// Split a leading front matter block off `source`.
  ///
  /// The opening delimiter must be the first line. The closing delimiter may
  /// be the last line of the file without a trailing newline. Returns `None`
  /// when either delimiter is absent.
  #[must_use]
  pub fn extract(source: &'a str) -> Option<Self> {
    let source_body = source.strip_prefix('\u{feff}').unwrap_or(source);
    let offset = source.len() - source_body.len();

    let mut lines = source_body.split_inclusive('\n');
    let first = lines.next()?;
    if first.trim_end() != DELIMITER {
      return None;
    }

    let raw_start = first.len();
    let mut pos = raw_start;
    let mut line_no = 1;
    for line in lines {
      line_no += 1;
      if line.trim_end() == DELIMITER {
        let body_start = pos + line.len();
        return Some(Self {
          raw:       &source_body[raw_start..pos],
          body:      &source[offset + body_start..],
          body_line: line_no + 1,
        });
      }
      pos += line.len();
    }
    None
  }

  /// Parse the block into a mapping. An empty block is an empty mapping.
  ///
  /// # Errors
  ///
  /// Returns an error if the YAML is malformed or is not a mapping.
  pub fn parse(&self) -> Result<Mapping> {
    match serde_yaml::from_str::<Value>(self.raw)? {
      Value::Mapping(map) => Ok(map),
      Value::Null => Ok(Mapping::new()),
      Value::Bool(_) => Err(AnalysisError::FrontMatterShape("a boolean")),
      Value::Number(_) => Err(AnalysisError::FrontMatterShape("a number")),
      Value::String(_) => Err(AnalysisError::FrontMatterShape("a string")),
      Value::Sequence(_) => Err(AnalysisError::FrontMatterShape("a sequence")),
      Value::Tagged(_) => Err(AnalysisError::FrontMatterShape("a tagged value")),
    }
  }
}

/// Look up a string field in parsed front matter.
#[must_use]
pub fn string_field<'m>(map: &'m Mapping, key: &str) -> Option<&'m str> {
  map.get(key).and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]
  use super::*;

  #[test]
  fn test_extract_block() {
    let src = "---\ntitle: Guide\n---\n# Heading\n";
    let fm = FrontMatter::extract(src).unwrap();
    assert_eq!(fm.raw, "title: Guide\n");
    assert_eq!(fm.body, "# Heading\n");
    assert_eq!(fm.body_line, 4);
    let map = fm.parse().unwrap();
    assert_eq!(string_field(&map, "title"), Some("Guide"));
  }

  #[test]
  fn test_closing_delimiter_at_eof() {
    let fm = FrontMatter::extract("---\na: 1\n---").unwrap();
    assert_eq!(fm.raw, "a: 1\n");
    assert_eq!(fm.body, "");
  }

  #[test]
  fn test_not_leading_is_ignored() {
    assert!(FrontMatter::extract("# Title\n---\na: 1\n---\n").is_none());
    assert!(FrontMatter::extract("---\nunterminated: true\n").is_none());
  }

  #[test]
  fn test_empty_block_is_empty_mapping() {
    let fm = FrontMatter::extract("---\n---\nbody").unwrap();
    assert!(fm.parse().unwrap().is_empty());
  }

  #[test]
  fn test_non_mapping_is_error() {
    let fm = FrontMatter::extract("---\n- a\n- b\n---\n").unwrap();
    assert!(matches!(
      fm.parse(),
      Err(AnalysisError::FrontMatterShape("a sequence"))
    ));
  }

  #[test]
  fn test_malformed_yaml_is_error() {
    let fm = FrontMatter::extract("---\ntitle: [unclosed\n---\n").unwrap();
    assert!(matches!(fm.parse(), Err(AnalysisError::Yaml(_))));
  }
}
