//! Handlers for submission endpoints and the confirmation quorum.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/submissions` | Pending submissions with confirmation progress |
//! | `POST` | `/submissions` | Body: [`NewSubmissionBody`]; returns 201 |
//! | `POST` | `/submissions/:id/confirm` | Quorum evaluator; may promote |
//! | `DELETE` | `/submissions/:id/confirm` | Withdraw a confirmation |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use jangter_core::{
  merchant::Coordinates,
  quorum::ConfirmOutcome,
  store::DirectoryStore,
  submission::{NewSubmission, Submission, SubmissionStatus},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ApiState, error::ApiError, identity::Identity, identity::MaybeIdentity};

// ─── List ─────────────────────────────────────────────────────────────────────

/// A pending submission with the progress a voting list renders.
#[derive(Debug, Serialize)]
pub struct SubmissionProgress {
  pub submission:       Submission,
  pub confirmations:    u32,
  /// The quorum threshold, so progress bars always agree with the
  /// evaluator.
  pub required:         u32,
  pub viewer_confirmed: bool,
}

/// `GET /submissions` — pending only, newest first.
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  MaybeIdentity(viewer): MaybeIdentity,
) -> Result<Json<Vec<SubmissionProgress>>, ApiError>
where
  S: DirectoryStore,
  S::Error: Into<jangter_core::Error>,
{
  let submissions = state
    .store
    .list_submissions(Some(SubmissionStatus::Pending))
    .await
    .map_err(ApiError::from_store)?;

  let ids: Vec<Uuid> = submissions.iter().map(|s| s.submission_id).collect();
  let tallies = state
    .store
    .confirmation_tallies(ids, viewer)
    .await
    .map_err(ApiError::from_store)?;

  // confirmation_tallies preserves the order of the ids it was given.
  let required = state.quorum.threshold;
  Ok(Json(
    submissions
      .into_iter()
      .zip(tallies)
      .map(|(submission, tally)| SubmissionProgress {
        submission,
        confirmations: tally.confirmations,
        required,
        viewer_confirmed: tally.viewer_confirmed,
      })
      .collect(),
  ))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /submissions`.
#[derive(Debug, Deserialize)]
pub struct NewSubmissionBody {
  pub name:     String,
  pub address:  String,
  pub category: Option<String>,
  pub note:     Option<String>,
  pub coords:   Option<Coordinates>,
}

/// `POST /submissions` — returns 201 + the stored submission.
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  Identity(proposer): Identity,
  Json(body): Json<NewSubmissionBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DirectoryStore,
  S::Error: Into<jangter_core::Error>,
{
  if body.name.trim().is_empty() {
    return Err(ApiError::BadRequest("merchant name is empty".into()));
  }
  if body.address.trim().is_empty() {
    return Err(ApiError::BadRequest("merchant address is empty".into()));
  }

  let submission = state
    .store
    .submit(NewSubmission {
      proposer_id: proposer,
      name:        body.name,
      address:     body.address,
      category:    body.category,
      note:        body.note,
      coords:      body.coords,
    })
    .await
    .map_err(ApiError::from_store)?;

  Ok((StatusCode::CREATED, Json(submission)))
}

// ─── Confirm / unconfirm ──────────────────────────────────────────────────────

/// `POST /submissions/:id/confirm`
///
/// Returns the evaluator's [`ConfirmOutcome`]; `approved: true` means this
/// call crossed the threshold and the submission is now in the directory.
pub async fn confirm<S>(
  State(state): State<ApiState<S>>,
  Path(submission_id): Path<Uuid>,
  Identity(user): Identity,
) -> Result<Json<ConfirmOutcome>, ApiError>
where
  S: DirectoryStore,
  S::Error: Into<jangter_core::Error>,
{
  let outcome = state
    .store
    .confirm(user, submission_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(outcome))
}

/// `DELETE /submissions/:id/confirm` — withdrawing a vote never re-checks
/// the quorum; counts only decrease.
pub async fn unconfirm<S>(
  State(state): State<ApiState<S>>,
  Path(submission_id): Path<Uuid>,
  Identity(user): Identity,
) -> Result<StatusCode, ApiError>
where
  S: DirectoryStore,
  S::Error: Into<jangter_core::Error>,
{
  state
    .store
    .unconfirm(user, submission_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}
