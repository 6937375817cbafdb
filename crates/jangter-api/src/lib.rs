//! JSON REST API for jangter.
//!
//! Exposes an axum [`Router`] backed by any
//! [`jangter_core::store::DirectoryStore`]. Session validation, TLS, and
//! transport concerns are the caller's responsibility: the upstream identity
//! provider terminates authentication and forwards the verified user id in
//! the `x-user-id` header.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", jangter_api::api_router(store.clone(), quorum))
//! ```

pub mod error;
pub mod favorites;
pub mod identity;
pub mod merchants;
pub mod reports;
pub mod reviews;
pub mod submissions;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, post, put},
};
use jangter_core::{quorum::QuorumPolicy, store::DirectoryStore};

pub use error::ApiError;
pub use identity::{Identity, MaybeIdentity};

/// Shared state threaded through all API handlers.
///
/// Carries the quorum policy alongside the store so progress displays and
/// the evaluator always agree on the threshold.
pub struct ApiState<S> {
  pub store:  Arc<S>,
  pub quorum: QuorumPolicy,
}

// Derived `Clone` would require `S: Clone`; only the `Arc` needs cloning.
impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self { store: self.store.clone(), quorum: self.quorum }
  }
}

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>, quorum: QuorumPolicy) -> Router<()>
where
  S: DirectoryStore + Send + Sync + 'static,
  S::Error: Into<jangter_core::Error>,
{
  Router::new()
    // Merchants
    .route("/merchants", get(merchants::list::<S>))
    .route("/merchants/{id}", get(merchants::get_one::<S>))
    // Reviews
    .route(
      "/merchants/{id}/reviews",
      get(reviews::list::<S>).post(reviews::create::<S>),
    )
    .route("/reviews/{id}", delete(reviews::delete_one::<S>))
    .route(
      "/reviews/{id}/like",
      put(reviews::like::<S>).delete(reviews::unlike::<S>),
    )
    // Favorites
    .route(
      "/merchants/{id}/favorite",
      put(favorites::add::<S>).delete(favorites::remove::<S>),
    )
    .route("/favorites", get(favorites::list::<S>))
    // Closure reports
    .route("/merchants/{id}/reports", post(reports::create::<S>))
    // Submissions and the confirmation quorum
    .route(
      "/submissions",
      get(submissions::list::<S>).post(submissions::create::<S>),
    )
    .route(
      "/submissions/{id}/confirm",
      post(submissions::confirm::<S>).delete(submissions::unconfirm::<S>),
    )
    .with_state(ApiState { store, quorum })
}
