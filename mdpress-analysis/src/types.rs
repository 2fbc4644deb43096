//! Types for the structural-analysis public API.
use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Byte ranges of a heading element inside the markup it was extracted from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingSpan {
  /// The start tag, from `<` up to and including `>`.
  pub start_tag: Range<usize>,
  /// Inner markup between the start and end tags.
  pub content:   Range<usize>,
  /// The end tag, `</hN>`.
  pub end_tag:   Range<usize>,

  /// Offset just past the last attribute of the start tag, or past the tag
  /// name when there are none. New attributes are inserted here, ahead of
  /// any trailing `/`.
  pub attributes_end: usize,

  /// The `id` attribute of the start tag, name through value, if present.
  pub id_attribute: Option<Range<usize>>,
}

/// Represents a heading in a rendered document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
  /// Heading level (1-6).
  pub level: u8,

  /// Inner markup of the heading, exactly as it appears in the source.
  pub raw_title: String,

  /// Title with inline markup stripped and entities decoded.
  pub plain_title: String,

  /// Anchor id, either pre-existing in the markup or generated.
  pub anchor_id: String,

  /// Whether `anchor_id` was already present on the element.
  pub has_explicit_id: bool,

  /// Dotted numbering label such as `1.2.1`, if numbering applies.
  pub number_label: Option<String>,

  /// Location of the element in the source markup.
  pub span: HeadingSpan,
}

impl Heading {
  /// Title as displayed in navigation: the plain title prefixed with its
  /// numbering label, when present.
  #[must_use]
  pub fn display_title(&self) -> String {
    match &self.number_label {
      Some(label) => format!("{label} {}", self.plain_title),
      None => self.plain_title.clone(),
    }
  }
}

/// Single navigable entry of a table of contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
  /// Heading level the entry was derived from.
  pub level:         u8,
  /// Indentation depth, `level - 1`.
  pub depth:         usize,
  /// Anchor the entry links to.
  pub anchor_id:     String,
  /// Visible label, including the numbering prefix when enabled.
  pub display_label: String,
}

/// Result of the structure pass over a rendered document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedDocument {
  /// Rewritten markup with anchors, optional numbering and the TOC.
  pub html: String,

  /// Headings in document order.
  pub headings: Vec<Heading>,

  /// Table of contents entries, present only when a TOC was inserted.
  pub toc: Option<Vec<TocEntry>>,

  /// Title of the document, if found (first level-1 heading).
  pub title: Option<String>,
}
