//! Handler for closure-report submission.
//!
//! Reports feed a display-only tally (see
//! [`jangter_core::report::ClosureSignal`]); they never mutate the
//! merchant's canonical state.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use jangter_core::{report::ReportStatus, store::DirectoryStore};
use serde::Deserialize;
use uuid::Uuid;

use crate::{ApiState, error::ApiError, identity::Identity};

/// JSON body accepted by `POST /merchants/:id/reports`.
#[derive(Debug, Deserialize)]
pub struct NewReportBody {
  pub status: ReportStatus,
}

/// `POST /merchants/:id/reports` — one report per user per merchant;
/// returns 201 + the stored report.
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  Path(merchant_id): Path<Uuid>,
  Identity(reporter): Identity,
  Json(body): Json<NewReportBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DirectoryStore,
  S::Error: Into<jangter_core::Error>,
{
  let report = state
    .store
    .report_closure(reporter, merchant_id, body.status)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(report)))
}
