//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("missing or invalid user identity")]
  Unauthorized,

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Classify a backend failure into an HTTP-mappable error.
  ///
  /// Domain violations become 4xx responses; anything else (IO, database)
  /// is a 500 and is never retried on the caller's behalf.
  pub fn from_store<E: Into<jangter_core::Error>>(err: E) -> Self {
    use jangter_core::Error as Core;
    match err.into() {
      // An approved/rejected/deleted submission looks like "not found"
      // to confirm/unconfirm callers.
      e @ (Core::SubmissionNotFound(_)
      | Core::SubmissionNotPending(_)
      | Core::MerchantNotFound(_)
      | Core::ReviewNotFound(_)) => ApiError::NotFound(e.to_string()),

      e @ (Core::SelfConfirmation(_) | Core::NotReviewAuthor(_)) => {
        ApiError::Forbidden(e.to_string())
      }

      e @ (Core::DuplicateConfirmation { .. }
      | Core::DuplicateReport { .. }
      | Core::DuplicateLike { .. }
      | Core::DuplicateFavorite { .. }) => ApiError::Conflict(e.to_string()),

      e @ Core::InvalidRating(_) => ApiError::BadRequest(e.to_string()),

      Core::Backend(e) => ApiError::Store(e),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Forbidden(m) => (StatusCode::FORBIDDEN, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Unauthorized => {
        (StatusCode::UNAUTHORIZED, self.to_string())
      }
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
