//! Acting-user extractors.
//!
//! Authentication is terminated upstream: the identity provider (or a
//! gateway fronting it) validates the session and injects the stable user
//! id in the `x-user-id` header. These extractors turn that header into
//! explicit request-scoped context — no handler reads ambient session
//! state.

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::ApiError;

/// Header carrying the verified user id.
pub const USER_ID_HEADER: &str = "x-user-id";

fn user_id_from_parts(parts: &Parts) -> Result<Option<Uuid>, ApiError> {
  let Some(value) = parts.headers.get(USER_ID_HEADER) else {
    return Ok(None);
  };

  let raw = value
    .to_str()
    .map_err(|_| ApiError::BadRequest("malformed x-user-id header".into()))?;
  let id = Uuid::parse_str(raw)
    .map_err(|_| ApiError::BadRequest("malformed x-user-id header".into()))?;

  Ok(Some(id))
}

/// The acting user. Rejects the request with 401 when no identity header
/// is present.
pub struct Identity(pub Uuid);

impl<St: Send + Sync> FromRequestParts<St> for Identity {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &St,
  ) -> Result<Self, Self::Rejection> {
    match user_id_from_parts(parts)? {
      Some(id) => Ok(Identity(id)),
      None => Err(ApiError::Unauthorized),
    }
  }
}

/// An optional viewer identity for read endpoints, used to mark the
/// viewer's own votes, likes, and favorites.
pub struct MaybeIdentity(pub Option<Uuid>);

impl<St: Send + Sync> FromRequestParts<St> for MaybeIdentity {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &St,
  ) -> Result<Self, Self::Rejection> {
    Ok(MaybeIdentity(user_id_from_parts(parts)?))
  }
}
