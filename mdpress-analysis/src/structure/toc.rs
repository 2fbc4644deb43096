//! Table of contents generation.
use std::fmt::Write;

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::types::{Heading, TocEntry};

/// Indentation applied per depth level, in pixels.
pub const INDENT_PX: usize = 20;

/// Minimum number of entries for a table of contents to be worth rendering.
pub const MIN_ENTRIES: usize = 2;

/// Build TOC entries for headings at or above `max_depth`.
#[must_use]
pub fn build_entries(headings: &[Heading], max_depth: u8) -> Vec<TocEntry> {
  headings
    .iter()
    .filter(|heading| heading.level <= max_depth)
    .map(|heading| {
      TocEntry {
        level:         heading.level,
        depth:         usize::from(heading.level.saturating_sub(1)),
        anchor_id:     heading.anchor_id.clone(),
        display_label: heading.display_title(),
      }
    })
    .collect()
}

/// Render entries as a self-contained navigation fragment.
///
/// The list is flat; hierarchy is conveyed by indentation only. The title is
/// a paragraph rather than a heading so that the fragment never feeds back
/// into heading extraction.
#[must_use]
pub fn render_toc(entries: &[TocEntry], title: &str) -> String {
  let mut toc = String::with_capacity(entries.len() * 96 + 128);
  toc.push_str("<nav class=\"table-of-contents\">");
  // Writing to String is infallible
  let _ = write!(toc, "<p class=\"toc-title\">{}</p>", encode_text(title));
  toc.push_str("<ul class=\"toc-list\">");
  for entry in entries {
    let _ = write!(
      toc,
      "<li class=\"toc-level-{}\" style=\"margin-left: {}px;\"><a \
       href=\"#{}\">{}</a></li>",
      entry.level,
      entry.depth * INDENT_PX,
      encode_double_quoted_attribute(&entry.anchor_id),
      encode_text(&entry.display_label)
    );
  }
  toc.push_str("</ul></nav>");
  toc
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::types::HeadingSpan;

  fn heading(level: u8, title: &str, label: Option<&str>) -> Heading {
    Heading {
      level,
      raw_title: title.to_string(),
      plain_title: title.to_string(),
      anchor_id: crate::utils::slugify(title),
      has_explicit_id: false,
      number_label: label.map(ToString::to_string),
      span: HeadingSpan {
        start_tag:      0..4,
        content:        4..4,
        end_tag:        4..9,
        attributes_end: 3,
        id_attribute:   None,
      },
    }
  }

  #[test]
  fn test_entries_filtered_by_depth() {
    let headings = [
      heading(1, "Intro", None),
      heading(2, "A", None),
      heading(4, "Deep", None),
    ];
    let entries = build_entries(&headings, 3);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].depth, 1);
  }

  #[test]
  fn test_display_label_includes_number() {
    let entries = build_entries(&[heading(2, "A", Some("1.1"))], 3);
    assert_eq!(entries[0].display_label, "1.1 A");
  }

  #[test]
  fn test_render_indents_and_escapes() {
    let entries = build_entries(
      &[heading(1, "Intro", None), heading(3, "Q&A <fast>", None)],
      3,
    );
    let html = render_toc(&entries, "Contents");
    assert!(html.starts_with("<nav class=\"table-of-contents\">"));
    assert!(html.contains("<p class=\"toc-title\">Contents</p>"));
    assert!(html.contains("style=\"margin-left: 0px;\"><a href=\"#intro\">Intro</a>"));
    assert!(html.contains("style=\"margin-left: 40px;\""));
    assert!(html.contains("Q&amp;A &lt;fast&gt;"));
    assert!(!html.contains("<h2"));
  }
}
