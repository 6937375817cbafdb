//! Reviews, review likes, and the aggregates shown on directory cards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Voucher type ────────────────────────────────────────────────────────────

/// Which voucher form the reviewer paid with, when they said.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoucherType {
  Paper,
  Card,
  Mobile,
}

// ─── Review ──────────────────────────────────────────────────────────────────

/// A visit review for a merchant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
  pub review_id:    Uuid,
  pub merchant_id:  Uuid,
  pub author_id:    Uuid,
  pub content:      String,
  /// Star rating, 1 through 5.
  pub rating:       u8,
  /// Whether the voucher was actually accepted on this visit.
  pub voucher_ok:   bool,
  pub voucher_type: Option<VoucherType>,
  /// Minimum spend the merchant required for voucher payment, in won.
  pub min_spend:    Option<u32>,
  /// Public URL of an uploaded photo. Upload and compression happen in an
  /// external storage service; only the resulting URL is recorded.
  pub image_url:    Option<String>,
  pub created_at:   DateTime<Utc>,
}

/// Input to [`crate::store::DirectoryStore::add_review`].
/// `review_id` and `created_at` are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewReview {
  pub merchant_id:  Uuid,
  pub author_id:    Uuid,
  pub content:      String,
  pub rating:       u8,
  pub voucher_ok:   bool,
  pub voucher_type: Option<VoucherType>,
  pub min_spend:    Option<u32>,
  pub image_url:    Option<String>,
}

impl NewReview {
  /// Reject out-of-range ratings before anything is written.
  pub fn validate(&self) -> Result<()> {
    if !(1..=5).contains(&self.rating) {
      return Err(Error::InvalidRating(self.rating));
    }
    Ok(())
  }
}

// ─── Aggregates ──────────────────────────────────────────────────────────────

/// Review aggregates for one merchant, computed on read.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ReviewStats {
  pub review_count:   u32,
  /// `None` when the merchant has no reviews.
  pub average_rating: Option<f64>,
  /// Percentage of reviews reporting a successful voucher payment,
  /// rounded; `None` when there are no reviews.
  pub usable_percent: Option<u8>,
}

/// Like tally for one review, relative to an optional viewer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LikeTally {
  pub review_id:    Uuid,
  pub likes:        u32,
  /// Always `false` when no viewer identity was supplied.
  pub viewer_liked: bool,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn new_review(rating: u8) -> NewReview {
    NewReview {
      merchant_id:  Uuid::new_v4(),
      author_id:    Uuid::new_v4(),
      content:      "friendly owner, vouchers accepted".into(),
      rating,
      voucher_ok:   true,
      voucher_type: Some(VoucherType::Paper),
      min_spend:    None,
      image_url:    None,
    }
  }

  #[test]
  fn ratings_one_through_five_are_valid() {
    for rating in 1..=5 {
      assert!(new_review(rating).validate().is_ok());
    }
  }

  #[test]
  fn out_of_range_ratings_are_rejected() {
    assert!(matches!(new_review(0).validate(), Err(Error::InvalidRating(0))));
    assert!(matches!(new_review(6).validate(), Err(Error::InvalidRating(6))));
  }
}
