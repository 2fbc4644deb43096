//! Validation rules.
//!
//! Each rule inspects a pre-scanned [`SourceDocument`] and returns its own
//! findings. Rules never fail: anything a rule cannot check becomes an issue
//! or is skipped. [`default_rules`] fixes the order in which they run, which
//! in turn fixes the order of reported issues.
mod lexical;
mod media;
mod metadata;
mod references;
mod structure;

pub use self::{
  lexical::{EmojiRule, LineStyleRule, ListMarkerRule},
  media::ImageRule,
  metadata::MetadataRule,
  references::LinkRule,
  structure::{HeadingCharactersRule, HeadingStructureRule},
};
use super::{
  ValidationOptions,
  fs::FileSystem,
  issue::ValidationIssue,
  source::SourceDocument,
};

/// Shared, read-only inputs for a rule pass.
#[derive(Clone, Copy)]
pub struct RuleContext<'a> {
  pub fs:      &'a dyn FileSystem,
  pub options: &'a ValidationOptions,
}

/// A single independent check.
pub trait Rule: Send + Sync {
  /// Short identifier used in logs.
  fn name(&self) -> &'static str;

  /// Inspect `doc` and return every issue found.
  fn check(
    &self,
    doc: &SourceDocument<'_>,
    ctx: &RuleContext<'_>,
  ) -> Vec<ValidationIssue>;
}

/// The standard rule set in execution order.
#[must_use]
pub fn default_rules() -> Vec<Box<dyn Rule>> {
  vec![
    Box::new(HeadingStructureRule),
    Box::new(LineStyleRule),
    Box::new(LinkRule),
    Box::new(ImageRule),
    Box::new(MetadataRule),
    Box::new(EmojiRule),
    Box::new(HeadingCharactersRule),
    Box::new(ListMarkerRule),
  ]
}
