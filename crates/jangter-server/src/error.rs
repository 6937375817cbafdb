//! Server error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::{StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use jangter_api::ApiError;

#[derive(Debug, Error)]
pub enum Error {
  /// Missing or invalid administrator credentials.
  #[error("unauthorized")]
  Unauthorized,

  #[error(transparent)]
  Api(#[from] ApiError),
}

impl Error {
  /// Classify a backend failure the same way the public API does.
  pub fn from_store<E: Into<jangter_core::Error>>(err: E) -> Self {
    Error::Api(ApiError::from_store(err))
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    match self {
      Error::Unauthorized => (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, "Basic realm=\"jangter admin\"")],
        Json(json!({ "error": "unauthorized" })),
      )
        .into_response(),
      Error::Api(e) => e.into_response(),
    }
  }
}
