//! Handlers for review endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/merchants/:id/reviews` | Newest first, with like tallies |
//! | `POST` | `/merchants/:id/reviews` | Body: [`NewReviewBody`]; returns 201 |
//! | `DELETE` | `/reviews/:id` | Author only |
//! | `PUT`  | `/reviews/:id/like` | One like per user |
//! | `DELETE` | `/reviews/:id/like` | Idempotent |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use jangter_core::{
  review::{NewReview, Review, VoucherType},
  store::DirectoryStore,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ApiState, error::ApiError, identity::Identity, identity::MaybeIdentity};

// ─── Shared read model ────────────────────────────────────────────────────────

/// A review bundled with its like tally.
#[derive(Debug, Serialize)]
pub struct ReviewWithLikes {
  #[serde(flatten)]
  pub review:       Review,
  pub likes:        u32,
  pub viewer_liked: bool,
}

/// Fetch a merchant's reviews and join their like tallies, newest first.
pub(crate) async fn reviews_with_likes<S>(
  store: &S,
  merchant_id: Uuid,
  viewer: Option<Uuid>,
) -> Result<Vec<ReviewWithLikes>, ApiError>
where
  S: DirectoryStore,
  S::Error: Into<jangter_core::Error>,
{
  let reviews = store
    .list_reviews(merchant_id)
    .await
    .map_err(ApiError::from_store)?;

  let ids: Vec<Uuid> = reviews.iter().map(|r| r.review_id).collect();
  let tallies = store
    .like_tallies(ids, viewer)
    .await
    .map_err(ApiError::from_store)?;

  // like_tallies preserves the order of the ids it was given.
  Ok(
    reviews
      .into_iter()
      .zip(tallies)
      .map(|(review, tally)| ReviewWithLikes {
        review,
        likes:        tally.likes,
        viewer_liked: tally.viewer_liked,
      })
      .collect(),
  )
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /merchants/:id/reviews`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  Path(merchant_id): Path<Uuid>,
  MaybeIdentity(viewer): MaybeIdentity,
) -> Result<Json<Vec<ReviewWithLikes>>, ApiError>
where
  S: DirectoryStore,
  S::Error: Into<jangter_core::Error>,
{
  let reviews = reviews_with_likes(&*state.store, merchant_id, viewer).await?;
  Ok(Json(reviews))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /merchants/:id/reviews`.
#[derive(Debug, Deserialize)]
pub struct NewReviewBody {
  pub content:      String,
  pub rating:       u8,
  pub voucher_ok:   bool,
  pub voucher_type: Option<VoucherType>,
  pub min_spend:    Option<u32>,
  pub image_url:    Option<String>,
}

/// `POST /merchants/:id/reviews` — returns 201 + the stored review.
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  Path(merchant_id): Path<Uuid>,
  Identity(author): Identity,
  Json(body): Json<NewReviewBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DirectoryStore,
  S::Error: Into<jangter_core::Error>,
{
  if body.content.trim().is_empty() {
    return Err(ApiError::BadRequest("review content is empty".into()));
  }

  let review = state
    .store
    .add_review(NewReview {
      merchant_id,
      author_id:    author,
      content:      body.content,
      rating:       body.rating,
      voucher_ok:   body.voucher_ok,
      voucher_type: body.voucher_type,
      min_spend:    body.min_spend,
      image_url:    body.image_url,
    })
    .await
    .map_err(ApiError::from_store)?;

  Ok((StatusCode::CREATED, Json(review)))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /reviews/:id` — 403 unless the caller authored the review.
pub async fn delete_one<S>(
  State(state): State<ApiState<S>>,
  Path(review_id): Path<Uuid>,
  Identity(user): Identity,
) -> Result<StatusCode, ApiError>
where
  S: DirectoryStore,
  S::Error: Into<jangter_core::Error>,
{
  state
    .store
    .delete_review(review_id, user)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Likes ────────────────────────────────────────────────────────────────────

/// `PUT /reviews/:id/like` — 409 when the user already liked it.
pub async fn like<S>(
  State(state): State<ApiState<S>>,
  Path(review_id): Path<Uuid>,
  Identity(user): Identity,
) -> Result<StatusCode, ApiError>
where
  S: DirectoryStore,
  S::Error: Into<jangter_core::Error>,
{
  state
    .store
    .like_review(user, review_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /reviews/:id/like` — removing a like twice is a no-op.
pub async fn unlike<S>(
  State(state): State<ApiState<S>>,
  Path(review_id): Path<Uuid>,
  Identity(user): Identity,
) -> Result<StatusCode, ApiError>
where
  S: DirectoryStore,
  S::Error: Into<jangter_core::Error>,
{
  state
    .store
    .unlike_review(user, review_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}
