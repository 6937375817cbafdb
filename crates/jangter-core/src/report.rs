//! Closure reports and their display-only tally.
//!
//! Reports never mutate a merchant's canonical state. Detail and list views
//! tally a small window of recent reports and show a warning tier computed
//! from it; the merchant row itself is untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How many of a merchant's most recent reports are considered when
/// computing the closure signal.
pub const REPORT_WINDOW: usize = 5;

/// `closed` reports within the window needed for [`ClosureSignal::SuspectedClosed`].
pub const SUSPECTED_CLOSED_AT: u32 = 3;

// ─── Report ──────────────────────────────────────────────────────────────────

/// What the reporter observed at the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
  /// Still operating and accepting vouchers.
  Open,
  /// Appears to be out of business.
  Closed,
  /// Operating, but no longer accepts vouchers.
  NoVoucher,
}

/// One user's assertion about a merchant's current state.
/// At most one report per (merchant, reporter) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClosureReport {
  pub report_id:   Uuid,
  pub merchant_id: Uuid,
  pub reporter_id: Uuid,
  pub status:      ReportStatus,
  pub created_at:  DateTime<Utc>,
}

// ─── Signal ──────────────────────────────────────────────────────────────────

/// Display tier derived from recent reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tier", rename_all = "snake_case")]
pub enum ClosureSignal {
  /// No `closed` reports in the window.
  None,
  /// One or two `closed` reports; shown as a caution badge with the count.
  Reported { count: u32 },
  /// Three or more `closed` reports; terminal display tier.
  SuspectedClosed,
}

impl ClosureSignal {
  /// Classify a merchant from its recent reports, newest first.
  ///
  /// Only the first [`REPORT_WINDOW`] entries are considered, and only
  /// `closed`-status reports count toward the tier; `open` and
  /// `no_voucher` reports are informational.
  pub fn classify(recent: &[ClosureReport]) -> Self {
    let closed = recent
      .iter()
      .take(REPORT_WINDOW)
      .filter(|r| r.status == ReportStatus::Closed)
      .count() as u32;

    match closed {
      0 => Self::None,
      n if n >= SUSPECTED_CLOSED_AT => Self::SuspectedClosed,
      n => Self::Reported { count: n },
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn report(status: ReportStatus) -> ClosureReport {
    ClosureReport {
      report_id:   Uuid::new_v4(),
      merchant_id: Uuid::new_v4(),
      reporter_id: Uuid::new_v4(),
      status,
      created_at:  Utc::now(),
    }
  }

  #[test]
  fn no_reports_is_none() {
    assert_eq!(ClosureSignal::classify(&[]), ClosureSignal::None);
  }

  #[test]
  fn open_reports_do_not_count() {
    let reports = vec![report(ReportStatus::Open), report(ReportStatus::NoVoucher)];
    assert_eq!(ClosureSignal::classify(&reports), ClosureSignal::None);
  }

  #[test]
  fn one_or_two_closed_is_reported() {
    let reports = vec![report(ReportStatus::Closed)];
    assert_eq!(
      ClosureSignal::classify(&reports),
      ClosureSignal::Reported { count: 1 }
    );

    let reports = vec![
      report(ReportStatus::Closed),
      report(ReportStatus::Open),
      report(ReportStatus::Closed),
    ];
    assert_eq!(
      ClosureSignal::classify(&reports),
      ClosureSignal::Reported { count: 2 }
    );
  }

  #[test]
  fn three_closed_is_suspected() {
    let reports: Vec<_> = (0..3).map(|_| report(ReportStatus::Closed)).collect();
    assert_eq!(ClosureSignal::classify(&reports), ClosureSignal::SuspectedClosed);
  }

  #[test]
  fn fourth_report_stays_at_terminal_tier() {
    let reports: Vec<_> = (0..4).map(|_| report(ReportStatus::Closed)).collect();
    assert_eq!(ClosureSignal::classify(&reports), ClosureSignal::SuspectedClosed);
  }

  #[test]
  fn only_the_window_counts() {
    // Three closed reports, but two of them fall outside the window of 5.
    let mut reports = vec![report(ReportStatus::Closed)];
    reports.extend((0..4).map(|_| report(ReportStatus::Open)));
    reports.extend((0..2).map(|_| report(ReportStatus::Closed)));

    assert_eq!(
      ClosureSignal::classify(&reports),
      ClosureSignal::Reported { count: 1 }
    );
  }
}
