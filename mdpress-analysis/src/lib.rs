//! # mdpress-analysis - structural analysis for Markdown documents
//!
//! The engine behind `mdpress`. It has two independent halves:
//!
//! - a **structure pass** over rendered HTML that assigns unique anchors,
//!   optional hierarchical section numbers and a table of contents, and
//! - a **validator** that runs an ordered rule set over raw Markdown and
//!   reports issues with a severity, a stable code and a remediation hint.
//!
//! ## Quick Start
//!
//! ```rust
//! use mdpress_analysis::{StructureOptions, render_document};
//!
//! let options = StructureOptions {
//!   enable_numbering: true,
//!   ..Default::default()
//! };
//! let doc = render_document("# Intro\n\n## Setup\n\n## Usage\n", &options);
//!
//! assert_eq!(doc.annotated.headings[1].number_label.as_deref(), Some("1.1"));
//! assert!(doc.annotated.html.contains("<nav class=\"table-of-contents\">"));
//! ```
//!
//! ## Validation
//!
//! ```rust
//! use std::path::Path;
//!
//! use mdpress_analysis::{MemoryFs, ValidationOptions, Validator};
//!
//! let fs = MemoryFs::new().with_file("docs/guide.md", "# Guide\n\n[next](next.md)\n");
//! let validator = Validator::new(ValidationOptions::default(), fs);
//! let result = validator.validate_file(Path::new("docs/guide.md"));
//!
//! assert!(!result.is_valid());
//! assert!(result.issues.iter().any(|issue| issue.code == "E004"));
//! ```

pub mod error;
pub mod frontmatter;
pub mod render;
pub mod report;
pub mod structure;
pub mod types;
pub mod utils;
pub mod validate;

pub use crate::{
  error::{AnalysisError, Result},
  frontmatter::FrontMatter,
  render::{
    PageSettings,
    RenderedDocument,
    StyleSettings,
    Theme,
    default_stylesheet,
    html_document,
    read_markdown,
    render_document,
    render_markdown,
  },
  report::{ContentStats, Summary, render_json_report, render_text_report},
  structure::{StructureOptions, annotate, extract_headings},
  types::{AnnotatedDocument, Heading, HeadingSpan, TocEntry},
  utils::{collect_markdown_files, slugify},
  validate::{
    DiskFs,
    FileSystem,
    IssueKind,
    MemoryFs,
    Severity,
    ValidationIssue,
    ValidationOptions,
    ValidationResult,
    Validator,
  },
};
