//! Quorum policy for community confirmation of submissions.
//!
//! The threshold is a single shared value: the store applies it when
//! deciding whether to promote, and the API reports it so progress bars
//! render against the same number. It is never duplicated as a literal.

use serde::{Deserialize, Serialize};

/// Distinct confirmations required before a submission is auto-promoted.
pub const DEFAULT_CONFIRM_THRESHOLD: u32 = 5;

/// How many independent confirmations promote a submission into the
/// directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuorumPolicy {
  pub threshold: u32,
}

impl Default for QuorumPolicy {
  fn default() -> Self {
    Self { threshold: DEFAULT_CONFIRM_THRESHOLD }
  }
}

impl QuorumPolicy {
  pub fn new(threshold: u32) -> Self { Self { threshold } }

  /// True once `confirmations` is enough to promote.
  pub fn satisfied_by(&self, confirmations: u32) -> bool {
    confirmations >= self.threshold
  }
}

/// Result of a confirmation event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ConfirmOutcome {
  /// True if this confirmation crossed the threshold and promoted the
  /// submission as a side effect of the call.
  pub approved:      bool,
  /// The recounted ledger total after the insert, for display.
  pub confirmations: u32,
}
