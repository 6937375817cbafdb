//! Administrative override handlers, mounted under `/admin`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/admin/submissions` | All statuses; optional `?status=` filter |
//! | `POST` | `/admin/submissions/:id/approve` | Promote regardless of votes |
//! | `POST` | `/admin/submissions/:id/reject` | Terminal; no merchant created |
//! | `DELETE` | `/admin/submissions/:id` | Remove; confirmations cascade |
//! | `POST` | `/admin/reconcile` | Fix up half-completed promotions |
//!
//! Every route requires Basic auth (see [`crate::auth::AdminAuth`]).

use axum::{
  Json, Router,
  extract::{Path, Query, State},
  http::StatusCode,
  routing::{delete, get, post},
};
use jangter_core::{
  merchant::Merchant,
  store::DirectoryStore,
  submission::{Submission, SubmissionStatus},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, auth::AdminAuth, error::Error};

/// Build the admin router for `state`.
pub fn admin_router<S>(state: AppState<S>) -> Router<()>
where
  S: DirectoryStore + Send + Sync + 'static,
  S::Error: Into<jangter_core::Error>,
{
  Router::new()
    .route("/submissions", get(list_submissions::<S>))
    .route("/submissions/{id}/approve", post(approve::<S>))
    .route("/submissions/{id}/reject", post(reject::<S>))
    .route("/submissions/{id}", delete(remove::<S>))
    .route("/reconcile", post(reconcile::<S>))
    .with_state(state)
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub status: Option<SubmissionStatus>,
}

/// `GET /admin/submissions[?status=pending|approved|rejected]`
async fn list_submissions<S>(
  State(state): State<AppState<S>>,
  _auth: AdminAuth,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Submission>>, Error>
where
  S: DirectoryStore + Send + Sync + 'static,
  S::Error: Into<jangter_core::Error>,
{
  let submissions = state
    .store
    .list_submissions(params.status)
    .await
    .map_err(Error::from_store)?;
  Ok(Json(submissions))
}

// ─── Overrides ────────────────────────────────────────────────────────────────

/// `POST /admin/submissions/:id/approve` — returns the created merchant.
async fn approve<S>(
  State(state): State<AppState<S>>,
  _auth: AdminAuth,
  Path(id): Path<Uuid>,
) -> Result<Json<Merchant>, Error>
where
  S: DirectoryStore + Send + Sync + 'static,
  S::Error: Into<jangter_core::Error>,
{
  let merchant = state
    .store
    .approve_submission(id)
    .await
    .map_err(Error::from_store)?;
  Ok(Json(merchant))
}

/// `POST /admin/submissions/:id/reject`
async fn reject<S>(
  State(state): State<AppState<S>>,
  _auth: AdminAuth,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, Error>
where
  S: DirectoryStore + Send + Sync + 'static,
  S::Error: Into<jangter_core::Error>,
{
  state
    .store
    .reject_submission(id)
    .await
    .map_err(Error::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /admin/submissions/:id`
async fn remove<S>(
  State(state): State<AppState<S>>,
  _auth: AdminAuth,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, Error>
where
  S: DirectoryStore + Send + Sync + 'static,
  S::Error: Into<jangter_core::Error>,
{
  state
    .store
    .delete_submission(id)
    .await
    .map_err(Error::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Reconciliation ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ReconcileOutcome {
  /// Submissions that were flipped to `approved` because a matching
  /// directory entry already existed.
  pub approved: Vec<Uuid>,
}

/// `POST /admin/reconcile`
async fn reconcile<S>(
  State(state): State<AppState<S>>,
  _auth: AdminAuth,
) -> Result<Json<ReconcileOutcome>, Error>
where
  S: DirectoryStore + Send + Sync + 'static,
  S::Error: Into<jangter_core::Error>,
{
  let approved = state
    .store
    .reconcile_submissions()
    .await
    .map_err(Error::from_store)?;
  Ok(Json(ReconcileOutcome { approved }))
}
