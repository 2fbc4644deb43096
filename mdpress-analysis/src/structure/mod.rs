//! Heading structure analysis for rendered documents.
//!
//! The pass runs strictly in document order over one document:
//!
//! - [`markup`]: tokenizes the rendered HTML and locates heading elements
//! - [`anchors`]: assigns unique anchor ids, preserving pre-existing ones
//! - [`numbering`]: computes dotted section labels
//! - [`toc`]: builds and renders the table of contents
//!
//! The result is carried on each [`Heading`] directly, and [`annotate`]
//! splices ids, labels and the TOC into the input markup. The only existing
//! bytes it rewrites are blank `id` attributes, which are replaced by the
//! generated anchor.
pub mod anchors;
pub(crate) mod markup;
pub mod numbering;
pub mod toc;

use std::ops::Range;

use log::trace;
use serde::{Deserialize, Serialize};

pub use self::{
  anchors::AnchorRegistry,
  numbering::NumberingState,
  toc::{build_entries, render_toc},
};
use crate::types::{AnnotatedDocument, Heading};

/// Options for the structure pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructureOptions {
  /// Insert a table of contents.
  pub toc: bool,

  /// Deepest heading level listed in the TOC and numbered.
  pub max_heading_depth: u8,

  /// Prefix headings with dotted section numbers.
  pub enable_numbering: bool,

  /// Caption rendered above the TOC list.
  pub toc_title: String,
}

impl Default for StructureOptions {
  fn default() -> Self {
    Self {
      toc:               true,
      max_heading_depth: 3,
      enable_numbering:  false,
      toc_title:         "Table of Contents".to_string(),
    }
  }
}

/// Extract headings from rendered markup, assigning anchors and, when
/// enabled, numbering labels.
#[must_use]
pub fn extract_headings(html: &str, options: &StructureOptions) -> Vec<Heading> {
  let raw = markup::scan_headings(html);

  let mut registry = AnchorRegistry::new();
  for heading in &raw {
    if let Some(id) = &heading.existing_id {
      registry.reserve(id);
    }
  }

  let mut numbering = NumberingState::new(options.max_heading_depth);

  raw
    .into_iter()
    .map(|heading| {
      let raw_title = html[heading.span.content.clone()].to_string();
      let plain_title = markup::plain_text(&raw_title);
      let has_explicit_id = heading.existing_id.is_some();
      let anchor_id = heading
        .existing_id
        .unwrap_or_else(|| registry.allocate(&plain_title));
      let number_label = if options.enable_numbering {
        numbering.advance(heading.level)
      } else {
        None
      };

      Heading {
        level: heading.level,
        raw_title,
        plain_title,
        anchor_id,
        has_explicit_id,
        number_label,
        span: heading.span,
      }
    })
    .collect()
}

/// Run the structure pass over rendered markup.
///
/// Every heading receives an anchor. A TOC is inserted when enabled and at
/// least two headings fall within `max_heading_depth`; it goes right after
/// the first heading if the document opens with one, and at the very start
/// otherwise.
#[must_use]
pub fn annotate(html: &str, options: &StructureOptions) -> AnnotatedDocument {
  let headings = extract_headings(html, options);

  let mut edits: Vec<(Range<usize>, String)> =
    Vec::with_capacity(headings.len() * 2 + 1);

  let entries = build_entries(&headings, options.max_heading_depth);
  let toc = (options.toc && entries.len() >= toc::MIN_ENTRIES).then_some(entries);

  if let Some(entries) = &toc {
    let opens_with_heading = headings.first().is_some_and(|first| {
      markup::first_significant_offset(html) == Some(first.span.start_tag.start)
    });
    let at = match headings.first() {
      Some(first) if opens_with_heading => first.span.end_tag.end,
      _ => 0,
    };
    let fragment = render_toc(entries, &options.toc_title);
    edits.push((at..at, format!("\n{fragment}\n")));
  }

  for heading in &headings {
    if !heading.has_explicit_id {
      let id = format!("id=\"{}\"", heading.anchor_id);
      match &heading.span.id_attribute {
        Some(blank) => edits.push((blank.clone(), id)),
        None => {
          let at = heading.span.attributes_end;
          edits.push((at..at, format!(" {id}")));
        },
      }
    }
    if let Some(label) = &heading.number_label {
      let at = heading.span.start_tag.end;
      edits.push((at..at, format!("{label} ")));
    }
  }

  trace!(
    "Structure pass: {} headings, {} edits, toc: {}",
    headings.len(),
    edits.len(),
    toc.is_some()
  );

  let title = headings
    .iter()
    .find(|heading| heading.level == 1)
    .map(|heading| heading.plain_title.clone());

  AnnotatedDocument {
    html: apply_edits(html, edits),
    headings,
    toc,
    title,
  }
}

/// Splice edits into `src`, each replacing its range (empty for a plain
/// insertion). Ranges must not overlap; edits at the same offset keep their
/// relative order.
fn apply_edits(src: &str, mut edits: Vec<(Range<usize>, String)>) -> String {
  edits.sort_by_key(|(range, _)| range.start);

  let extra: usize = edits.iter().map(|(_, text)| text.len()).sum();
  let mut out = String::with_capacity(src.len() + extra);
  let mut cursor = 0;
  for (range, text) in edits {
    out.push_str(&src[cursor..range.start]);
    out.push_str(&text);
    cursor = range.end;
  }
  out.push_str(&src[cursor..]);
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  fn numbered() -> StructureOptions {
    StructureOptions {
      enable_numbering: true,
      ..Default::default()
    }
  }

  #[test]
  fn test_apply_edits_in_order() {
    let out = apply_edits("abcd", vec![
      (4..4, "!".to_string()),
      (1..1, "1".to_string()),
      (1..1, "2".to_string()),
      (2..3, "X".to_string()),
    ]);
    assert_eq!(out, "a12bXd!");
  }

  #[test]
  fn test_blank_id_replaced_in_place() {
    let html = r#"<h2 id="">Setup</h2><h2 class="c" id="  ">Other</h2><h3 id>Bare</h3>"#;
    let doc = annotate(html, &StructureOptions {
      toc: false,
      ..Default::default()
    });
    assert_eq!(
      doc.html,
      r#"<h2 id="setup">Setup</h2><h2 class="c" id="other">Other</h2><h3 id="bare">Bare</h3>"#
    );
    assert_eq!(doc.html.matches("id=").count(), 3);
    assert_eq!(doc.headings[0].anchor_id, "setup");
    assert!(!doc.headings[0].has_explicit_id);
  }

  #[test]
  fn test_blank_id_anchor_matches_toc_link() {
    let html = r#"<h2 id="">Setup</h2><h2>Other</h2>"#;
    let doc = annotate(html, &StructureOptions::default());
    assert!(doc.html.contains(r##"<a href="#setup">Setup</a>"##));
    assert!(doc.html.contains(r#"<h2 id="setup">Setup</h2>"#));
    assert!(!doc.html.contains(r#"id="""#));
  }

  #[test]
  fn test_id_inserted_before_self_closing_slash() {
    let html = r#"<h2 class="x"/>Setup</h2><h3/>Next</h3>"#;
    let doc = annotate(html, &StructureOptions {
      toc: false,
      ..Default::default()
    });
    assert_eq!(
      doc.html,
      r#"<h2 class="x" id="setup"/>Setup</h2><h3 id="next"/>Next</h3>"#
    );
  }

  #[test]
  fn test_existing_id_preserved() {
    let html = r#"<h1 id="top">Title</h1><h2>Top</h2>"#;
    let doc = annotate(html, &StructureOptions::default());
    assert_eq!(doc.headings[0].anchor_id, "top");
    assert!(doc.headings[0].has_explicit_id);
    assert_eq!(doc.headings[1].anchor_id, "top-1");
    assert!(doc.html.starts_with(r#"<h1 id="top">Title</h1>"#));
    assert!(doc.html.contains(r#"<h2 id="top-1">Top</h2>"#));
  }

  #[test]
  fn test_numbering_prefix_inserted_after_start_tag() {
    let html = "<h1>Intro</h1>\n<h2 class=\"x\">A</h2>";
    let doc = annotate(html, &StructureOptions {
      toc: false,
      ..numbered()
    });
    assert_eq!(
      doc.html,
      "<h1 id=\"intro\">1 Intro</h1>\n<h2 class=\"x\" id=\"a\">1.1 A</h2>"
    );
  }

  #[test]
  fn test_toc_after_leading_heading() {
    let html = "<h1>Doc</h1>\n<p>x</p>\n<h2>One</h2>\n<h2>Two</h2>";
    let doc = annotate(html, &StructureOptions::default());
    let toc_at = doc.html.find("<nav").unwrap_or_default();
    let first_end = doc.html.find("</h1>").unwrap_or_default();
    assert_eq!(toc_at, first_end + "</h1>\n".len());
  }

  #[test]
  fn test_toc_at_start_without_leading_heading() {
    let html = "<p>Preamble</p>\n<h2>One</h2>\n<h2>Two</h2>";
    let doc = annotate(html, &StructureOptions::default());
    assert!(doc.html.starts_with("\n<nav class=\"table-of-contents\">"));
  }

  #[test]
  fn test_no_headings_is_untouched() {
    let html = "<p>nothing here</p>";
    let doc = annotate(html, &numbered());
    assert_eq!(doc.html, html);
    assert!(doc.headings.is_empty());
    assert!(doc.toc.is_none());
    assert!(doc.title.is_none());
  }
}
