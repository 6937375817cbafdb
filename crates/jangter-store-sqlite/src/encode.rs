//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. UUIDs are stored as
//! hyphenated lowercase strings. Enums are stored as their lowercase /
//! snake_case wire names.

use chrono::{DateTime, Utc};
use jangter_core::{
  merchant::{Coordinates, Merchant, PayMethods},
  report::{ClosureReport, ReportStatus},
  review::{Review, VoucherType},
  submission::{Submission, SubmissionStatus},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(e.to_string()))
}

// ─── SubmissionStatus ────────────────────────────────────────────────────────

pub fn encode_submission_status(s: SubmissionStatus) -> &'static str {
  match s {
    SubmissionStatus::Pending => "pending",
    SubmissionStatus::Approved => "approved",
    SubmissionStatus::Rejected => "rejected",
  }
}

pub fn decode_submission_status(s: &str) -> Result<SubmissionStatus> {
  match s {
    "pending" => Ok(SubmissionStatus::Pending),
    "approved" => Ok(SubmissionStatus::Approved),
    "rejected" => Ok(SubmissionStatus::Rejected),
    other => Err(Error::Decode(format!("unknown submission status: {other:?}"))),
  }
}

// ─── ReportStatus ────────────────────────────────────────────────────────────

pub fn encode_report_status(s: ReportStatus) -> &'static str {
  match s {
    ReportStatus::Open => "open",
    ReportStatus::Closed => "closed",
    ReportStatus::NoVoucher => "no_voucher",
  }
}

pub fn decode_report_status(s: &str) -> Result<ReportStatus> {
  match s {
    "open" => Ok(ReportStatus::Open),
    "closed" => Ok(ReportStatus::Closed),
    "no_voucher" => Ok(ReportStatus::NoVoucher),
    other => Err(Error::Decode(format!("unknown report status: {other:?}"))),
  }
}

// ─── VoucherType ─────────────────────────────────────────────────────────────

pub fn encode_voucher_type(v: VoucherType) -> &'static str {
  match v {
    VoucherType::Paper => "paper",
    VoucherType::Card => "card",
    VoucherType::Mobile => "mobile",
  }
}

pub fn decode_voucher_type(s: &str) -> Result<VoucherType> {
  match s {
    "paper" => Ok(VoucherType::Paper),
    "card" => Ok(VoucherType::Card),
    "mobile" => Ok(VoucherType::Mobile),
    other => Err(Error::Decode(format!("unknown voucher type: {other:?}"))),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `merchants` row.
pub struct RawMerchant {
  pub merchant_id:  String,
  pub name:         String,
  pub address:      String,
  pub road_address: Option<String>,
  pub market_name:  Option<String>,
  pub phone:        Option<String>,
  pub category:     Option<String>,
  pub lat:          f64,
  pub lng:          f64,
  pub paper:        bool,
  pub card:         bool,
  pub mobile:       bool,
  pub created_at:   String,
}

impl RawMerchant {
  pub fn into_merchant(self) -> Result<Merchant> {
    Ok(Merchant {
      merchant_id:  decode_uuid(&self.merchant_id)?,
      name:         self.name,
      address:      self.address,
      road_address: self.road_address,
      market_name:  self.market_name,
      phone:        self.phone,
      category:     self.category,
      coords:       Coordinates { lat: self.lat, lng: self.lng },
      pay:          PayMethods {
        paper:  self.paper,
        card:   self.card,
        mobile: self.mobile,
      },
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `submissions` row.
pub struct RawSubmission {
  pub submission_id: String,
  pub proposer_id:   String,
  pub name:          String,
  pub address:       String,
  pub category:      Option<String>,
  pub note:          Option<String>,
  pub lat:           Option<f64>,
  pub lng:           Option<f64>,
  pub status:        String,
  pub created_at:    String,
}

impl RawSubmission {
  pub fn into_submission(self) -> Result<Submission> {
    // Both coordinate columns are written together; a half-set pair would
    // be a bug, so treat it as no coordinates.
    let coords = match (self.lat, self.lng) {
      (Some(lat), Some(lng)) => Some(Coordinates { lat, lng }),
      _ => None,
    };

    Ok(Submission {
      submission_id: decode_uuid(&self.submission_id)?,
      proposer_id:   decode_uuid(&self.proposer_id)?,
      name:          self.name,
      address:       self.address,
      category:      self.category,
      note:          self.note,
      coords,
      status:        decode_submission_status(&self.status)?,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `reviews` row.
pub struct RawReview {
  pub review_id:    String,
  pub merchant_id:  String,
  pub author_id:    String,
  pub content:      String,
  pub rating:       u8,
  pub voucher_ok:   bool,
  pub voucher_type: Option<String>,
  pub min_spend:    Option<u32>,
  pub image_url:    Option<String>,
  pub created_at:   String,
}

impl RawReview {
  pub fn into_review(self) -> Result<Review> {
    Ok(Review {
      review_id:    decode_uuid(&self.review_id)?,
      merchant_id:  decode_uuid(&self.merchant_id)?,
      author_id:    decode_uuid(&self.author_id)?,
      content:      self.content,
      rating:       self.rating,
      voucher_ok:   self.voucher_ok,
      voucher_type: self
        .voucher_type
        .as_deref()
        .map(decode_voucher_type)
        .transpose()?,
      min_spend:    self.min_spend,
      image_url:    self.image_url,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `reports` row.
pub struct RawReport {
  pub report_id:   String,
  pub merchant_id: String,
  pub reporter_id: String,
  pub status:      String,
  pub created_at:  String,
}

impl RawReport {
  pub fn into_report(self) -> Result<ClosureReport> {
    Ok(ClosureReport {
      report_id:   decode_uuid(&self.report_id)?,
      merchant_id: decode_uuid(&self.merchant_id)?,
      reporter_id: decode_uuid(&self.reporter_id)?,
      status:      decode_report_status(&self.status)?,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}
