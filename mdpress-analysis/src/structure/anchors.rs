//! Per-document anchor allocation.
use std::collections::HashSet;

use crate::utils::slugify;

/// Base used when a title slugifies to nothing.
pub const FALLBACK_ANCHOR: &str = "section";

/// Hands out unique anchor ids within one document.
///
/// The first heading with a given slug keeps the bare slug; later ones get
/// `-1`, `-2`, ... appended. Ids already present in the markup are reserved
/// verbatim and are never rewritten, even when they collide with each other.
#[derive(Debug, Default)]
pub struct AnchorRegistry {
  taken: HashSet<String>,
}

impl AnchorRegistry {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Reserve an id that already exists in the markup.
  pub fn reserve(&mut self, id: &str) {
    self.taken.insert(id.to_string());
  }

  /// Allocate a fresh anchor for `title`.
  pub fn allocate(&mut self, title: &str) -> String {
    let mut base = slugify(title);
    if base.is_empty() {
      base = FALLBACK_ANCHOR.to_string();
    }

    let mut candidate = base.clone();
    let mut suffix = 0usize;
    while self.taken.contains(&candidate) {
      suffix += 1;
      candidate = format!("{base}-{suffix}");
    }

    self.taken.insert(candidate.clone());
    candidate
  }
}
