//! Submission — a user-proposed merchant record awaiting confirmation.
//!
//! A submission is written once by its proposer and never edited by them
//! afterwards. Only the quorum evaluator or an administrator moves it
//! through its lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::merchant::Coordinates;

/// Lifecycle state of a submission.
///
/// `pending` is the only state the evaluator accepts confirmations in.
/// `approved` and `rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
  Pending,
  Approved,
  Rejected,
}

/// A proposed merchant record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
  pub submission_id: Uuid,
  /// The user who proposed this merchant. May never confirm it.
  pub proposer_id:   Uuid,
  pub name:          String,
  pub address:       String,
  pub category:      Option<String>,
  /// Free-text note from the proposer, e.g. opening hours or a landmark.
  pub note:          Option<String>,
  /// Present when the proposer's address search resolved coordinates.
  pub coords:        Option<Coordinates>,
  pub status:        SubmissionStatus,
  pub created_at:    DateTime<Utc>,
}

/// Input to [`crate::store::DirectoryStore::submit`].
/// `submission_id`, `status`, and `created_at` are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewSubmission {
  pub proposer_id: Uuid,
  pub name:        String,
  pub address:     String,
  pub category:    Option<String>,
  pub note:        Option<String>,
  pub coords:      Option<Coordinates>,
}
