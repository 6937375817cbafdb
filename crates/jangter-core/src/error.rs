//! Error types for `jangter-core`.
//!
//! Storage backends convert their own error types into this enum so that
//! generic callers (the API layer) can classify a failure without knowing
//! which backend produced it.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("submission not found: {0}")]
  SubmissionNotFound(Uuid),

  #[error("submission {0} is no longer pending")]
  SubmissionNotPending(Uuid),

  #[error("a proposer cannot confirm their own submission ({0})")]
  SelfConfirmation(Uuid),

  #[error("user {user_id} has already confirmed submission {submission_id}")]
  DuplicateConfirmation { user_id: Uuid, submission_id: Uuid },

  #[error("merchant not found: {0}")]
  MerchantNotFound(Uuid),

  #[error("review not found: {0}")]
  ReviewNotFound(Uuid),

  #[error("user {0} is not the author of this review")]
  NotReviewAuthor(Uuid),

  #[error("user {reporter_id} has already reported merchant {merchant_id}")]
  DuplicateReport { merchant_id: Uuid, reporter_id: Uuid },

  #[error("user {user_id} has already liked review {review_id}")]
  DuplicateLike { user_id: Uuid, review_id: Uuid },

  #[error("user {user_id} has already favorited merchant {merchant_id}")]
  DuplicateFavorite { user_id: Uuid, merchant_id: Uuid },

  #[error("rating must be between 1 and 5, got {0}")]
  InvalidRating(u8),

  /// IO or database failure inside a storage backend. Never retried
  /// automatically; callers report it and leave the state unchanged.
  #[error("backend error: {0}")]
  Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
