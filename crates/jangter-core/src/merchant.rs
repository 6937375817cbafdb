//! Merchant — a canonical directory entry.
//!
//! Merchants are never created directly by end users: every row enters the
//! directory either through quorum promotion of a community submission or
//! through an administrative approval. Address-to-coordinate resolution is
//! an out-of-process batch concern; freshly promoted merchants carry the
//! `(0, 0)` sentinel until that job fills them in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Coordinates ─────────────────────────────────────────────────────────────

/// A WGS-84 point. `(0, 0)` is the agreed sentinel for "not yet geocoded".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
  pub lat: f64,
  pub lng: f64,
}

impl Coordinates {
  /// The "not yet geocoded" sentinel, consumed by the external batch job.
  pub const UNGEOCODED: Self = Self { lat: 0.0, lng: 0.0 };

  pub fn is_ungeocoded(&self) -> bool { *self == Self::UNGEOCODED }
}

impl Default for Coordinates {
  fn default() -> Self { Self::UNGEOCODED }
}

// ─── Payment methods ─────────────────────────────────────────────────────────

/// Which voucher forms the merchant accepts. All flags default to `false`
/// until verified; population is handled by the same batch pipeline that
/// fills in road addresses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayMethods {
  pub paper:  bool,
  pub card:   bool,
  pub mobile: bool,
}

// ─── Merchant ────────────────────────────────────────────────────────────────

/// A canonical directory entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Merchant {
  pub merchant_id:  Uuid,
  pub name:         String,
  /// Lot-number address as submitted; always present.
  pub address:      String,
  /// Road-name address, filled in by the geocoding batch job.
  pub road_address: Option<String>,
  /// Traditional-market association, if any.
  pub market_name:  Option<String>,
  pub phone:        Option<String>,
  pub category:     Option<String>,
  pub coords:       Coordinates,
  pub pay:          PayMethods,
  pub created_at:   DateTime<Utc>,
}

// ─── NewMerchant ─────────────────────────────────────────────────────────────

/// Input for creating a directory entry. Used by quorum promotion and by
/// administrative approval; `merchant_id` and `created_at` are assigned by
/// the store.
#[derive(Debug, Clone)]
pub struct NewMerchant {
  pub name:     String,
  pub address:  String,
  pub category: Option<String>,
  /// Missing coordinates become [`Coordinates::UNGEOCODED`].
  pub coords:   Option<Coordinates>,
}
