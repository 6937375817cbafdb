//! Handlers for `/merchants` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/merchants` | Search/filter/sort/pagination |
//! | `GET`  | `/merchants/:id` | Full detail; viewer-aware when `x-user-id` is present |

use axum::{
  Json,
  extract::{Path, Query, State},
};
use jangter_core::{
  merchant::Merchant,
  report::{ClosureReport, ClosureSignal},
  review::ReviewStats,
  store::{DirectoryStore, MerchantPage, MerchantQuery, MerchantSort},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  ApiState,
  error::ApiError,
  identity::MaybeIdentity,
  reviews::{ReviewWithLikes, reviews_with_likes},
};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  /// Free-text filter matched against name and address.
  pub search: Option<String>,
  /// Region prefix matched against the start of the address.
  pub region: Option<String>,
  #[serde(default)]
  pub paper:  bool,
  #[serde(default)]
  pub card:   bool,
  #[serde(default)]
  pub mobile: bool,
  #[serde(default)]
  pub sort:   MerchantSort,
  pub limit:  Option<usize>,
  pub offset: Option<usize>,
}

/// `GET /merchants[?search=...][&region=...][&paper=true][&sort=name][&limit=...][&offset=...]`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<MerchantPage>, ApiError>
where
  S: DirectoryStore,
  S::Error: Into<jangter_core::Error>,
{
  let query = MerchantQuery {
    text:   params.search,
    region: params.region,
    paper:  params.paper,
    card:   params.card,
    mobile: params.mobile,
    sort:   params.sort,
    limit:  params.limit,
    offset: params.offset,
  };

  let page = state
    .store
    .search_merchants(query)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(page))
}

// ─── Detail ───────────────────────────────────────────────────────────────────

/// Everything a merchant detail view renders in one response.
#[derive(Debug, Serialize)]
pub struct MerchantDetail {
  pub merchant:  Merchant,
  pub stats:     ReviewStats,
  pub reviews:   Vec<ReviewWithLikes>,
  /// The most recent closure reports, newest first, capped at the tally
  /// window.
  pub reports:   Vec<ClosureReport>,
  pub closure:   ClosureSignal,
  /// Whether the viewer has favorited this merchant; `false` without a
  /// viewer identity.
  pub favorited: bool,
}

/// `GET /merchants/:id`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
  MaybeIdentity(viewer): MaybeIdentity,
) -> Result<Json<MerchantDetail>, ApiError>
where
  S: DirectoryStore,
  S::Error: Into<jangter_core::Error>,
{
  let store = &state.store;

  let merchant = store
    .get_merchant(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("merchant {id} not found")))?;

  let reviews = reviews_with_likes(&**store, id, viewer).await?;
  let stats = store.review_stats(id).await.map_err(ApiError::from_store)?;
  let reports = store
    .recent_reports(id)
    .await
    .map_err(ApiError::from_store)?;
  let closure = ClosureSignal::classify(&reports);

  let favorited = match viewer {
    Some(user) => store
      .is_favorite(user, id)
      .await
      .map_err(ApiError::from_store)?,
    None => false,
  };

  Ok(Json(MerchantDetail {
    merchant,
    stats,
    reviews,
    reports,
    closure,
    favorited,
  }))
}
