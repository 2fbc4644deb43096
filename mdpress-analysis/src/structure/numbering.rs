//! Hierarchical section numbering.

/// Number of heading levels tracked.
pub const LEVELS: usize = 6;

/// Counter stack for one document's numbering pass.
///
/// The label of a heading joins the non-zero counters up to its level, so a
/// level-3 heading directly under a level-1 heading is labelled `1.1` rather
/// than `1.0.1`: numbering follows the nesting actually encountered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NumberingState {
  counters:  [u32; LEVELS],
  max_depth: u8,
}

impl NumberingState {
  /// Create a state that numbers headings of level `1..=max_depth`.
  #[must_use]
  pub fn new(max_depth: u8) -> Self {
    Self {
      counters:  [0; LEVELS],
      max_depth: max_depth.min(6),
    }
  }

  /// Advance the counters for a heading of `level` and return its label.
  ///
  /// Returns `None`, leaving the counters untouched, for levels outside
  /// `1..=max_depth`.
  pub fn advance(&mut self, level: u8) -> Option<String> {
    if level == 0 || level > self.max_depth {
      return None;
    }
    let idx = usize::from(level) - 1;

    self.counters[idx] += 1;
    for counter in &mut self.counters[idx + 1..] {
      *counter = 0;
    }

    let label = self.counters[..=idx]
      .iter()
      .filter(|c| **c > 0)
      .map(ToString::to_string)
      .collect::<Vec<_>>()
      .join(".");
    Some(label)
  }

  /// Current counter values, outermost level first.
  #[must_use]
  pub const fn counters(&self) -> &[u32; LEVELS] {
    &self.counters
  }
}
