//! Error type for `jangter-store-sqlite`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] jangter_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("column decode error: {0}")]
  Decode(String),

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
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Lets generic API code classify backend failures without naming this
/// crate: domain violations map onto their core counterparts, everything
/// else is an opaque backend fault.
impl From<Error> for jangter_core::Error {
  fn from(err: Error) -> Self {
    use jangter_core::Error as Core;
    match err {
      Error::Core(e) => e,
      Error::SubmissionNotFound(id) => Core::SubmissionNotFound(id),
      Error::SubmissionNotPending(id) => Core::SubmissionNotPending(id),
      Error::SelfConfirmation(id) => Core::SelfConfirmation(id),
      Error::DuplicateConfirmation { user_id, submission_id } => {
        Core::DuplicateConfirmation { user_id, submission_id }
      }
      Error::MerchantNotFound(id) => Core::MerchantNotFound(id),
      Error::ReviewNotFound(id) => Core::ReviewNotFound(id),
      Error::NotReviewAuthor(id) => Core::NotReviewAuthor(id),
      Error::DuplicateReport { merchant_id, reporter_id } => {
        Core::DuplicateReport { merchant_id, reporter_id }
      }
      Error::DuplicateLike { user_id, review_id } => {
        Core::DuplicateLike { user_id, review_id }
      }
      Error::DuplicateFavorite { user_id, merchant_id } => {
        Core::DuplicateFavorite { user_id, merchant_id }
      }
      other => Core::Backend(Box::new(other)),
    }
  }
}
