#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Fine in tests")]
use mdpress_analysis::{StructureOptions, annotate, render_document, slugify};

fn numbered() -> StructureOptions {
  StructureOptions {
    toc: true,
    max_heading_depth: 3,
    enable_numbering: true,
    ..Default::default()
  }
}

#[test]
fn test_numbered_document_with_toc() {
  let source = "# Intro\n\nHello.\n\n## A\n\n## B\n\n### B.1\n";
  let doc = render_document(source, &numbered()).annotated;

  let labels: Vec<_> = doc
    .headings
    .iter()
    .map(|h| h.number_label.as_deref().unwrap_or_default())
    .collect();
  assert_eq!(labels, vec!["1", "1.1", "1.2", "1.2.1"]);

  let toc = doc.toc.expect("toc with four headings");
  let depths: Vec<_> = toc.iter().map(|entry| entry.depth).collect();
  assert_eq!(depths, vec![0, 1, 1, 2]);
  assert_eq!(toc[3].display_label, "1.2.1 B.1");
  assert_eq!(toc[3].anchor_id, "b1");

  assert!(doc.html.contains("<h1 id=\"intro\">1 Intro</h1>\n<nav"));
  assert!(doc.html.contains("<h3 id=\"b1\">1.2.1 B.1</h3>"));
  assert!(doc.html.contains("style=\"margin-left: 40px;\"><a href=\"#b1\">1.2.1 B.1</a>"));
  assert_eq!(doc.title.as_deref(), Some("Intro"));
}

#[test]
fn test_single_heading_has_no_toc() {
  let doc = render_document("# Only\n\ntext\n", &numbered()).annotated;
  assert!(doc.toc.is_none());
  assert!(!doc.html.contains("<nav"));
}

#[test]
fn test_toc_ignores_headings_beyond_depth() {
  let options = StructureOptions {
    max_heading_depth: 1,
    ..numbered()
  };
  let doc = render_document("# One\n\n## Sub\n\n### Deeper\n", &options).annotated;
  assert!(doc.toc.is_none());
  assert_eq!(doc.headings[1].number_label, None);
  assert_eq!(doc.headings.len(), 3);
  assert!(doc.headings.iter().all(|h| !h.anchor_id.is_empty()));
}

#[test]
fn test_toc_disabled() {
  let options = StructureOptions {
    toc: false,
    ..numbered()
  };
  let doc = render_document("# A\n\n## B\n", &options).annotated;
  assert!(doc.toc.is_none());
  assert_eq!(doc.headings[1].number_label.as_deref(), Some("1.1"));
}

#[test]
fn test_duplicate_and_empty_titles_get_unique_anchors() {
  let source = "# Setup\n\n## Setup\n\n## ¿?\n\n## Setup\n";
  let doc = render_document(source, &StructureOptions::default()).annotated;
  let ids: Vec<_> = doc.headings.iter().map(|h| h.anchor_id.as_str()).collect();
  assert_eq!(ids, vec!["setup", "setup-1", "section", "setup-2"]);
}

#[test]
fn test_only_insertions_are_made() {
  let html = "<!-- generated -->\n<h1 class=\"t\">Title &amp; <em>more</em></h1>\n<p>a &lt; b</p>\n<h2 id=\"keep\">Kept</h2>\n<pre><code>&lt;h2&gt;no&lt;/h2&gt;</code></pre>\n";
  let options = StructureOptions {
    toc: false,
    ..numbered()
  };
  let doc = annotate(html, &options);

  assert_eq!(doc.headings.len(), 2);
  assert_eq!(doc.headings[0].plain_title, "Title & more");
  assert_eq!(doc.headings[0].anchor_id, "title--more");

  let stripped = doc
    .html
    .replacen(" id=\"title--more\"", "", 1)
    .replacen(">1 Title", ">Title", 1)
    .replacen(">1.1 Kept", ">Kept", 1);
  assert_eq!(stripped, html);
}

#[test]
fn test_slugify_properties() {
  for input in ["Hello World", "Ünïcödé ☃ text", "already-a-slug", "", "  "] {
    let slug = slugify(input);
    assert!(
      slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    );
    assert_eq!(slugify(&slug), slug);
  }
}
