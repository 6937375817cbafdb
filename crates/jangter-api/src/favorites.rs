//! Handlers for favorite endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `PUT`  | `/merchants/:id/favorite` | 409 when already favorited |
//! | `DELETE` | `/merchants/:id/favorite` | Idempotent |
//! | `GET`  | `/favorites` | The viewer's bookmarks, newest first |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use jangter_core::{merchant::Merchant, store::DirectoryStore};
use uuid::Uuid;

use crate::{ApiState, error::ApiError, identity::Identity};

/// `PUT /merchants/:id/favorite`
pub async fn add<S>(
  State(state): State<ApiState<S>>,
  Path(merchant_id): Path<Uuid>,
  Identity(user): Identity,
) -> Result<StatusCode, ApiError>
where
  S: DirectoryStore,
  S::Error: Into<jangter_core::Error>,
{
  state
    .store
    .add_favorite(user, merchant_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /merchants/:id/favorite`
pub async fn remove<S>(
  State(state): State<ApiState<S>>,
  Path(merchant_id): Path<Uuid>,
  Identity(user): Identity,
) -> Result<StatusCode, ApiError>
where
  S: DirectoryStore,
  S::Error: Into<jangter_core::Error>,
{
  state
    .store
    .remove_favorite(user, merchant_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}

/// `GET /favorites`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  Identity(user): Identity,
) -> Result<Json<Vec<Merchant>>, ApiError>
where
  S: DirectoryStore,
  S::Error: Into<jangter_core::Error>,
{
  let merchants = state
    .store
    .list_favorites(user)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(merchants))
}
