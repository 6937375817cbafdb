//! The `DirectoryStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `jangter-store-sqlite`).
//! Higher layers (`jangter-api`, `jangter-server`) depend on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  merchant::{Merchant, NewMerchant},
  quorum::ConfirmOutcome,
  report::{ClosureReport, ClosureSignal, ReportStatus},
  review::{LikeTally, NewReview, Review, ReviewStats},
  submission::{NewSubmission, Submission, SubmissionStatus},
};

// ─── Query types ─────────────────────────────────────────────────────────────

/// Sort order for [`DirectoryStore::search_merchants`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MerchantSort {
  /// Merchants with the most reviews first.
  #[default]
  MostReviewed,
  /// Alphabetical by display name.
  Name,
  /// Most recently added first.
  Newest,
}

/// Parameters for [`DirectoryStore::search_merchants`].
#[derive(Debug, Clone, Default)]
pub struct MerchantQuery {
  /// Free-text filter matched against name and address.
  pub text:   Option<String>,
  /// Region prefix matched against the start of the address
  /// (e.g. `"서울"`).
  pub region: Option<String>,
  /// Payment-method filters; set flags are ANDed together.
  pub paper:  bool,
  pub card:   bool,
  pub mobile: bool,
  pub sort:   MerchantSort,
  pub limit:  Option<usize>,
  pub offset: Option<usize>,
}

// ─── Result types ────────────────────────────────────────────────────────────

/// A directory entry bundled with the display aggregates list views need.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MerchantWithStats {
  pub merchant: Merchant,
  pub stats:    ReviewStats,
  pub closure:  ClosureSignal,
}

/// One page of search results plus the filtered total for page controls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MerchantPage {
  pub merchants: Vec<MerchantWithStats>,
  pub total:     u64,
}

/// Confirmation progress for one submission, relative to an optional viewer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ConfirmationTally {
  pub submission_id:    Uuid,
  pub confirmations:    u32,
  /// Always `false` when no viewer identity was supplied.
  pub viewer_confirmed: bool,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a jangter directory backend.
///
/// Quorum evaluation (`confirm`) and promotion are the backend's
/// responsibility because only the backend can make the
/// insert/recount/promote sequence atomic. Everything else is a plain read
/// or a single conditional write.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait DirectoryStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Merchants ─────────────────────────────────────────────────────────

  /// Create and persist a directory entry. Used by administrative
  /// approval; quorum promotion runs inside [`DirectoryStore::confirm`].
  fn add_merchant(
    &self,
    input: NewMerchant,
  ) -> impl Future<Output = Result<Merchant, Self::Error>> + Send + '_;

  /// Retrieve a merchant by id. Returns `None` if not found.
  fn get_merchant(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Merchant>, Self::Error>> + Send + '_;

  /// Search the directory with filters, sort, and pagination.
  fn search_merchants(
    &self,
    query: MerchantQuery,
  ) -> impl Future<Output = Result<MerchantPage, Self::Error>> + Send + '_;

  // ── Submissions ───────────────────────────────────────────────────────

  /// Record a new community submission in `pending` state.
  fn submit(
    &self,
    input: NewSubmission,
  ) -> impl Future<Output = Result<Submission, Self::Error>> + Send + '_;

  /// Retrieve a submission by id. Returns `None` if not found.
  fn get_submission(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Submission>, Self::Error>> + Send + '_;

  /// List submissions, newest first, optionally restricted to one status.
  fn list_submissions(
    &self,
    status: Option<SubmissionStatus>,
  ) -> impl Future<Output = Result<Vec<Submission>, Self::Error>> + Send + '_;

  /// Confirmation progress for a batch of submissions, with the viewer's
  /// own votes marked when an identity is supplied.
  fn confirmation_tallies(
    &self,
    submission_ids: Vec<Uuid>,
    viewer: Option<Uuid>,
  ) -> impl Future<Output = Result<Vec<ConfirmationTally>, Self::Error>> + Send + '_;

  // ── Quorum evaluator ──────────────────────────────────────────────────

  /// Record one user's confirmation of a pending submission, recount the
  /// ledger, and promote the submission into the directory if the count
  /// reaches the configured threshold.
  ///
  /// The whole sequence is atomic: self-confirmation and duplicate votes
  /// are rejected without side effects, and under concurrent
  /// threshold-crossing calls exactly one promotion occurs.
  fn confirm(
    &self,
    user_id: Uuid,
    submission_id: Uuid,
  ) -> impl Future<Output = Result<ConfirmOutcome, Self::Error>> + Send + '_;

  /// Withdraw a confirmation. Deleting a vote that does not exist is not
  /// an error; counts only decrease, so no quorum re-check happens here.
  fn unconfirm(
    &self,
    user_id: Uuid,
    submission_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Administrative overrides ──────────────────────────────────────────

  /// Promote a pending submission regardless of its confirmation count.
  /// Shares the promotion path with [`DirectoryStore::confirm`].
  fn approve_submission(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Merchant, Self::Error>> + Send + '_;

  /// Mark a pending submission `rejected` (terminal; no merchant created).
  fn reject_submission(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Remove a submission entirely. Its confirmation rows are
  /// cascade-deleted.
  fn delete_submission(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Corrective pass: any `pending` submission whose (name, address) is
  /// already present in the directory is marked `approved` without
  /// creating a second merchant. Returns the ids that were fixed up.
  fn reconcile_submissions(
    &self,
  ) -> impl Future<Output = Result<Vec<Uuid>, Self::Error>> + Send + '_;

  // ── Reviews ───────────────────────────────────────────────────────────

  /// Persist a review. Validates the rating before writing.
  fn add_review(
    &self,
    input: NewReview,
  ) -> impl Future<Output = Result<Review, Self::Error>> + Send + '_;

  /// All reviews for a merchant, newest first.
  fn list_reviews(
    &self,
    merchant_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Review>, Self::Error>> + Send + '_;

  /// Delete a review. Only the author may delete; likes cascade.
  fn delete_review(
    &self,
    review_id: Uuid,
    acting_user: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Review aggregates for one merchant.
  fn review_stats(
    &self,
    merchant_id: Uuid,
  ) -> impl Future<Output = Result<ReviewStats, Self::Error>> + Send + '_;

  // ── Review likes ──────────────────────────────────────────────────────

  /// Record a like. At most one per (user, review).
  fn like_review(
    &self,
    user_id: Uuid,
    review_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Remove a like if present; idempotent.
  fn unlike_review(
    &self,
    user_id: Uuid,
    review_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Like tallies for a batch of reviews, with the viewer's own likes
  /// marked when an identity is supplied.
  fn like_tallies(
    &self,
    review_ids: Vec<Uuid>,
    viewer: Option<Uuid>,
  ) -> impl Future<Output = Result<Vec<LikeTally>, Self::Error>> + Send + '_;

  // ── Favorites ─────────────────────────────────────────────────────────

  /// Bookmark a merchant. At most one per (user, merchant).
  fn add_favorite(
    &self,
    user_id: Uuid,
    merchant_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Remove a bookmark if present; idempotent.
  fn remove_favorite(
    &self,
    user_id: Uuid,
    merchant_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn is_favorite(
    &self,
    user_id: Uuid,
    merchant_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// The user's bookmarked merchants, most recently added first.
  fn list_favorites(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Merchant>, Self::Error>> + Send + '_;

  // ── Closure reports ───────────────────────────────────────────────────

  /// Record a closure report. At most one per (merchant, reporter).
  fn report_closure(
    &self,
    reporter_id: Uuid,
    merchant_id: Uuid,
    status: ReportStatus,
  ) -> impl Future<Output = Result<ClosureReport, Self::Error>> + Send + '_;

  /// The merchant's most recent reports, newest first, capped at
  /// [`crate::report::REPORT_WINDOW`].
  fn recent_reports(
    &self,
    merchant_id: Uuid,
  ) -> impl Future<Output = Result<Vec<ClosureReport>, Self::Error>> + Send + '_;
}
