//! [`SqliteStore`] — the SQLite implementation of [`DirectoryStore`].

use std::{
  collections::{HashMap, HashSet},
  path::Path,
};

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use jangter_core::{
  merchant::{Coordinates, Merchant, NewMerchant, PayMethods},
  quorum::{ConfirmOutcome, QuorumPolicy},
  report::{ClosureReport, ClosureSignal, REPORT_WINDOW, ReportStatus},
  review::{LikeTally, NewReview, Review, ReviewStats},
  store::{
    ConfirmationTally, DirectoryStore, MerchantPage, MerchantQuery, MerchantSort,
    MerchantWithStats,
  },
  submission::{NewSubmission, Submission, SubmissionStatus},
};

use crate::{
  Error, Result,
  encode::{
    RawMerchant, RawReport, RawReview, RawSubmission, decode_uuid, encode_dt,
    encode_report_status, encode_submission_status, encode_uuid, encode_voucher_type,
  },
  schema::SCHEMA,
};

/// Page size used when a search query does not specify one.
const DEFAULT_PAGE_SIZE: usize = 20;

// ─── Constraint classification ───────────────────────────────────────────────

/// What happened to an insert that may collide with schema constraints.
enum WriteOutcome {
  Done,
  /// UNIQUE or PRIMARY KEY collision — the row already exists.
  DuplicateRow,
  /// FOREIGN KEY violation — the referenced parent row does not exist.
  MissingParent,
}

fn classify_insert(result: rusqlite::Result<usize>) -> rusqlite::Result<WriteOutcome> {
  match result {
    Ok(_) => Ok(WriteOutcome::Done),
    Err(rusqlite::Error::SqliteFailure(e, msg)) => match e.extended_code {
      rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
      | rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE => Ok(WriteOutcome::DuplicateRow),
      rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY => Ok(WriteOutcome::MissingParent),
      _ => Err(rusqlite::Error::SqliteFailure(e, msg)),
    },
    Err(e) => Err(e),
  }
}

// ─── Promotion ───────────────────────────────────────────────────────────────

/// Flip a pending submission to `approved` and copy it into the directory,
/// inside the caller's transaction. Missing coordinates become the
/// `(0, 0)` "not yet geocoded" sentinel.
///
/// Returns `false` when the submission was no longer pending — the status
/// guard makes promotion exactly-once even if two callers cross the
/// threshold at the same time.
fn promote_in_tx(
  tx: &rusqlite::Transaction<'_>,
  submission_id: &str,
  merchant_id: &str,
  now: &str,
) -> rusqlite::Result<bool> {
  let changed = tx.execute(
    "UPDATE submissions SET status = 'approved'
     WHERE submission_id = ?1 AND status = 'pending'",
    rusqlite::params![submission_id],
  )?;
  if changed == 0 {
    return Ok(false);
  }

  tx.execute(
    "INSERT INTO merchants (merchant_id, name, address, category, lat, lng, created_at)
     SELECT ?2, name, address, category, COALESCE(lat, 0.0), COALESCE(lng, 0.0), ?3
     FROM submissions WHERE submission_id = ?1",
    rusqlite::params![submission_id, merchant_id, now],
  )?;
  Ok(true)
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A jangter directory backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn:   tokio_rusqlite::Connection,
  quorum: QuorumPolicy,
}

impl SqliteStore {
  /// Open (or create) a store at `path` with the default quorum policy
  /// and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    Self::open_with_policy(path, QuorumPolicy::default()).await
  }

  /// Open (or create) a store at `path` with an explicit quorum policy.
  pub async fn open_with_policy(
    path: impl AsRef<Path>,
    quorum: QuorumPolicy,
  ) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn, quorum };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    Self::open_in_memory_with_policy(QuorumPolicy::default()).await
  }

  /// Open an in-memory store with an explicit quorum policy.
  pub async fn open_in_memory_with_policy(quorum: QuorumPolicy) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn, quorum };
    store.init_schema().await?;
    Ok(store)
  }

  /// The quorum policy this store promotes with. The API layer reports the
  /// same value so progress displays never disagree with the evaluator.
  pub fn quorum(&self) -> QuorumPolicy { self.quorum }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Recent reports for a batch of merchants, keyed by the encoded
  /// merchant id, each list newest first and capped at [`REPORT_WINDOW`].
  async fn recent_reports_batch(
    &self,
    merchant_ids: Vec<String>,
  ) -> Result<HashMap<String, Vec<ClosureReport>>> {
    if merchant_ids.is_empty() {
      return Ok(HashMap::new());
    }

    let window = REPORT_WINDOW as i64;

    let raws: Vec<RawReport> = self
      .conn
      .call(move |conn| {
        let placeholders = vec!["?"; merchant_ids.len()].join(", ");
        let sql = format!(
          "SELECT report_id, merchant_id, reporter_id, status, created_at
           FROM (
             SELECT report_id, merchant_id, reporter_id, status, created_at,
                    ROW_NUMBER() OVER (
                      PARTITION BY merchant_id
                      ORDER BY created_at DESC, report_id
                    ) AS rn
             FROM reports
             WHERE merchant_id IN ({placeholders})
           )
           WHERE rn <= {window}
           ORDER BY merchant_id, rn"
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(merchant_ids.iter()), |row| {
            Ok(RawReport {
              report_id:   row.get(0)?,
              merchant_id: row.get(1)?,
              reporter_id: row.get(2)?,
              status:      row.get(3)?,
              created_at:  row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut by_merchant: HashMap<String, Vec<ClosureReport>> = HashMap::new();
    for raw in raws {
      let key = raw.merchant_id.clone();
      by_merchant.entry(key).or_default().push(raw.into_report()?);
    }
    Ok(by_merchant)
  }
}

// ─── Closure steps ───────────────────────────────────────────────────────────

// Domain decisions made inside a `conn.call` closure are carried out as
// plain values; the closure's own error channel stays reserved for SQLite
// failures.

enum ConfirmStep {
  NotFound,
  NotPending,
  SelfVote,
  Duplicate,
  Counted { count: u32, promoted: bool },
}

enum StatusStep {
  NotFound,
  NotPending,
  Done,
}

enum ApproveStep {
  NotFound,
  NotPending,
  Approved {
    name:     String,
    address:  String,
    category: Option<String>,
    lat:      Option<f64>,
    lng:      Option<f64>,
  },
}

// ─── DirectoryStore impl ─────────────────────────────────────────────────────

impl DirectoryStore for SqliteStore {
  type Error = Error;

  // ── Merchants ─────────────────────────────────────────────────────────────

  async fn add_merchant(&self, input: NewMerchant) -> Result<Merchant> {
    let merchant = Merchant {
      merchant_id:  Uuid::new_v4(),
      name:         input.name,
      address:      input.address,
      road_address: None,
      market_name:  None,
      phone:        None,
      category:     input.category,
      coords:       input.coords.unwrap_or(Coordinates::UNGEOCODED),
      pay:          PayMethods::default(),
      created_at:   Utc::now(),
    };

    let id_str   = encode_uuid(merchant.merchant_id);
    let at_str   = encode_dt(merchant.created_at);
    let name     = merchant.name.clone();
    let address  = merchant.address.clone();
    let category = merchant.category.clone();
    let (lat, lng) = (merchant.coords.lat, merchant.coords.lng);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO merchants (merchant_id, name, address, category, lat, lng, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![id_str, name, address, category, lat, lng, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(merchant)
  }

  async fn get_merchant(&self, id: Uuid) -> Result<Option<Merchant>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawMerchant> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT merchant_id, name, address, road_address, market_name,
                    phone, category, lat, lng, paper, card, mobile, created_at
             FROM merchants WHERE merchant_id = ?1",
            rusqlite::params![id_str],
            |row| {
              Ok(RawMerchant {
                merchant_id:  row.get(0)?,
                name:         row.get(1)?,
                address:      row.get(2)?,
                road_address: row.get(3)?,
                market_name:  row.get(4)?,
                phone:        row.get(5)?,
                category:     row.get(6)?,
                lat:          row.get(7)?,
                lng:          row.get(8)?,
                paper:        row.get(9)?,
                card:         row.get(10)?,
                mobile:       row.get(11)?,
                created_at:   row.get(12)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawMerchant::into_merchant).transpose()
  }

  async fn search_merchants(&self, query: MerchantQuery) -> Result<MerchantPage> {
    // Empty filters degrade to match-all patterns so the placeholder
    // positions stay fixed regardless of which filters are set.
    let text_pattern   = format!("%{}%", query.text.as_deref().unwrap_or(""));
    let region_pattern = format!("{}%", query.region.as_deref().unwrap_or(""));
    let limit_val      = query.limit.unwrap_or(DEFAULT_PAGE_SIZE) as i64;
    let offset_val     = query.offset.unwrap_or(0) as i64;
    let (paper, card, mobile) = (query.paper, query.card, query.mobile);
    let sort = query.sort;

    type SearchRow = (RawMerchant, u32, Option<f64>, Option<f64>);

    let (raws, total): (Vec<SearchRow>, u64) = self
      .conn
      .call(move |conn| {
        let mut conds = vec![
          "(m.name LIKE ?1 OR m.address LIKE ?1)",
          "m.address LIKE ?2",
        ];
        if paper  { conds.push("m.paper = 1"); }
        if card   { conds.push("m.card = 1"); }
        if mobile { conds.push("m.mobile = 1"); }
        let where_clause = format!("WHERE {}", conds.join(" AND "));

        let total: i64 = conn.query_row(
          &format!("SELECT COUNT(*) FROM merchants m {where_clause}"),
          rusqlite::params![text_pattern, region_pattern],
          |r| r.get(0),
        )?;

        let order = match sort {
          MerchantSort::MostReviewed => "review_count DESC, m.created_at DESC",
          MerchantSort::Name         => "m.name ASC",
          MerchantSort::Newest       => "m.created_at DESC",
        };

        let sql = format!(
          "SELECT m.merchant_id, m.name, m.address, m.road_address, m.market_name,
                  m.phone, m.category, m.lat, m.lng, m.paper, m.card, m.mobile,
                  m.created_at,
                  COUNT(r.review_id) AS review_count,
                  AVG(r.rating)      AS average_rating,
                  AVG(r.voucher_ok)  AS usable_ratio
           FROM merchants m
           LEFT JOIN reviews r ON r.merchant_id = m.merchant_id
           {where_clause}
           GROUP BY m.merchant_id
           ORDER BY {order}
           LIMIT ?3 OFFSET ?4"
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![text_pattern, region_pattern, limit_val, offset_val],
            |row| {
              Ok((
                RawMerchant {
                  merchant_id:  row.get(0)?,
                  name:         row.get(1)?,
                  address:      row.get(2)?,
                  road_address: row.get(3)?,
                  market_name:  row.get(4)?,
                  phone:        row.get(5)?,
                  category:     row.get(6)?,
                  lat:          row.get(7)?,
                  lng:          row.get(8)?,
                  paper:        row.get(9)?,
                  card:         row.get(10)?,
                  mobile:       row.get(11)?,
                  created_at:   row.get(12)?,
                },
                row.get::<_, u32>(13)?,
                row.get::<_, Option<f64>>(14)?,
                row.get::<_, Option<f64>>(15)?,
              ))
            },
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((rows, total as u64))
      })
      .await?;

    let page_ids: Vec<String> =
      raws.iter().map(|(raw, ..)| raw.merchant_id.clone()).collect();
    let reports_by_merchant = self.recent_reports_batch(page_ids).await?;

    let mut merchants = Vec::with_capacity(raws.len());
    for (raw, review_count, average_rating, usable_ratio) in raws {
      let id_key   = raw.merchant_id.clone();
      let merchant = raw.into_merchant()?;
      let recent   = reports_by_merchant
        .get(&id_key)
        .map(Vec::as_slice)
        .unwrap_or(&[]);

      merchants.push(MerchantWithStats {
        merchant,
        stats: ReviewStats {
          review_count,
          average_rating,
          usable_percent: usable_ratio.map(|r| (r * 100.0).round() as u8),
        },
        closure: ClosureSignal::classify(recent),
      });
    }

    Ok(MerchantPage { merchants, total })
  }

  // ── Submissions ───────────────────────────────────────────────────────────

  async fn submit(&self, input: NewSubmission) -> Result<Submission> {
    let submission = Submission {
      submission_id: Uuid::new_v4(),
      proposer_id:   input.proposer_id,
      name:          input.name,
      address:       input.address,
      category:      input.category,
      note:          input.note,
      coords:        input.coords,
      status:        SubmissionStatus::Pending,
      created_at:    Utc::now(),
    };

    let id_str       = encode_uuid(submission.submission_id);
    let proposer_str = encode_uuid(submission.proposer_id);
    let at_str       = encode_dt(submission.created_at);
    let status_str   = encode_submission_status(submission.status).to_owned();
    let name         = submission.name.clone();
    let address      = submission.address.clone();
    let category     = submission.category.clone();
    let note         = submission.note.clone();
    let lat          = submission.coords.map(|c| c.lat);
    let lng          = submission.coords.map(|c| c.lng);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO submissions
             (submission_id, proposer_id, name, address, category, note, lat, lng, status, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
          rusqlite::params![
            id_str,
            proposer_str,
            name,
            address,
            category,
            note,
            lat,
            lng,
            status_str,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(submission)
  }

  async fn get_submission(&self, id: Uuid) -> Result<Option<Submission>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawSubmission> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT submission_id, proposer_id, name, address, category, note,
                    lat, lng, status, created_at
             FROM submissions WHERE submission_id = ?1",
            rusqlite::params![id_str],
            |row| {
              Ok(RawSubmission {
                submission_id: row.get(0)?,
                proposer_id:   row.get(1)?,
                name:          row.get(2)?,
                address:       row.get(3)?,
                category:      row.get(4)?,
                note:          row.get(5)?,
                lat:           row.get(6)?,
                lng:           row.get(7)?,
                status:        row.get(8)?,
                created_at:    row.get(9)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawSubmission::into_submission).transpose()
  }

  async fn list_submissions(
    &self,
    status: Option<SubmissionStatus>,
  ) -> Result<Vec<Submission>> {
    let status_str = status.map(encode_submission_status).map(str::to_owned);

    let raws: Vec<RawSubmission> = self
      .conn
      .call(move |conn| {
        let map_row = |row: &rusqlite::Row<'_>| {
          Ok(RawSubmission {
            submission_id: row.get(0)?,
            proposer_id:   row.get(1)?,
            name:          row.get(2)?,
            address:       row.get(3)?,
            category:      row.get(4)?,
            note:          row.get(5)?,
            lat:           row.get(6)?,
            lng:           row.get(7)?,
            status:        row.get(8)?,
            created_at:    row.get(9)?,
          })
        };

        let rows = if let Some(s) = status_str {
          let mut stmt = conn.prepare(
            "SELECT submission_id, proposer_id, name, address, category, note,
                    lat, lng, status, created_at
             FROM submissions WHERE status = ?1
             ORDER BY created_at DESC",
          )?;
          stmt
            .query_map(rusqlite::params![s], map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn.prepare(
            "SELECT submission_id, proposer_id, name, address, category, note,
                    lat, lng, status, created_at
             FROM submissions
             ORDER BY created_at DESC",
          )?;
          stmt
            .query_map([], map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSubmission::into_submission).collect()
  }

  async fn confirmation_tallies(
    &self,
    submission_ids: Vec<Uuid>,
    viewer: Option<Uuid>,
  ) -> Result<Vec<ConfirmationTally>> {
    if submission_ids.is_empty() {
      return Ok(Vec::new());
    }

    let id_strs: Vec<String> =
      submission_ids.iter().copied().map(encode_uuid).collect();
    let viewer_str = viewer.map(encode_uuid);

    let (counts, viewer_rows): (Vec<(String, u32)>, Vec<String>) = self
      .conn
      .call(move |conn| {
        let placeholders = vec!["?"; id_strs.len()].join(", ");

        let counts = conn
          .prepare(&format!(
            "SELECT submission_id, COUNT(*) FROM confirmations
             WHERE submission_id IN ({placeholders})
             GROUP BY submission_id"
          ))?
          .query_map(rusqlite::params_from_iter(id_strs.iter()), |row| {
            Ok((row.get(0)?, row.get(1)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let viewer_rows = if let Some(v) = viewer_str {
          conn
            .prepare(&format!(
              "SELECT submission_id FROM confirmations
               WHERE user_id = ? AND submission_id IN ({placeholders})"
            ))?
            .query_map(
              rusqlite::params_from_iter(
                std::iter::once(v).chain(id_strs.iter().cloned()),
              ),
              |row| row.get(0),
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          Vec::new()
        };

        Ok((counts, viewer_rows))
      })
      .await?;

    let count_map: HashMap<String, u32> = counts.into_iter().collect();
    let confirmed: HashSet<String> = viewer_rows.into_iter().collect();

    Ok(
      submission_ids
        .into_iter()
        .map(|id| {
          let key = encode_uuid(id);
          ConfirmationTally {
            submission_id:    id,
            confirmations:    count_map.get(&key).copied().unwrap_or(0),
            viewer_confirmed: confirmed.contains(&key),
          }
        })
        .collect(),
    )
  }

  // ── Quorum evaluator ──────────────────────────────────────────────────────

  async fn confirm(
    &self,
    user_id: Uuid,
    submission_id: Uuid,
  ) -> Result<ConfirmOutcome> {
    let quorum       = self.quorum;
    let user_str     = encode_uuid(user_id);
    let sub_str      = encode_uuid(submission_id);
    let now_str      = encode_dt(Utc::now());
    // Pre-assigned so the promotion insert can run inside the transaction.
    let merchant_str = encode_uuid(Uuid::new_v4());

    let step = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let row: Option<(String, String)> = tx
          .query_row(
            "SELECT proposer_id, status FROM submissions WHERE submission_id = ?1",
            rusqlite::params![sub_str],
            |r| Ok((r.get(0)?, r.get(1)?)),
          )
          .optional()?;

        let (proposer, status) = match row {
          Some(r) => r,
          None    => return Ok(ConfirmStep::NotFound),
        };
        if status != "pending" {
          return Ok(ConfirmStep::NotPending);
        }
        if proposer == user_str {
          return Ok(ConfirmStep::SelfVote);
        }

        let inserted = classify_insert(tx.execute(
          "INSERT INTO confirmations (submission_id, user_id, created_at)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![sub_str, user_str, now_str],
        ))?;
        if let WriteOutcome::DuplicateRow = inserted {
          return Ok(ConfirmStep::Duplicate);
        }

        // Always a fresh recount of ledger rows, never a cached counter.
        let count: u32 = tx.query_row(
          "SELECT COUNT(*) FROM confirmations WHERE submission_id = ?1",
          rusqlite::params![sub_str],
          |r| r.get(0),
        )?;

        let mut promoted = false;
        if quorum.satisfied_by(count) {
          promoted = promote_in_tx(&tx, &sub_str, &merchant_str, &now_str)?;
        }

        tx.commit()?;
        Ok(ConfirmStep::Counted { count, promoted })
      })
      .await?;

    match step {
      ConfirmStep::NotFound => Err(Error::SubmissionNotFound(submission_id)),
      ConfirmStep::NotPending => Err(Error::SubmissionNotPending(submission_id)),
      ConfirmStep::SelfVote => Err(Error::SelfConfirmation(submission_id)),
      ConfirmStep::Duplicate => {
        Err(Error::DuplicateConfirmation { user_id, submission_id })
      }
      ConfirmStep::Counted { count, promoted } => Ok(ConfirmOutcome {
        approved:      promoted,
        confirmations: count,
      }),
    }
  }

  async fn unconfirm(&self, user_id: Uuid, submission_id: Uuid) -> Result<()> {
    let user_str = encode_uuid(user_id);
    let sub_str  = encode_uuid(submission_id);

    let step = self
      .conn
      .call(move |conn| {
        let status: Option<String> = conn
          .query_row(
            "SELECT status FROM submissions WHERE submission_id = ?1",
            rusqlite::params![sub_str],
            |r| r.get(0),
          )
          .optional()?;

        match status.as_deref() {
          None => Ok(StatusStep::NotFound),
          Some("pending") => {
            // Deleting a vote that was never cast is a no-op.
            conn.execute(
              "DELETE FROM confirmations WHERE submission_id = ?1 AND user_id = ?2",
              rusqlite::params![sub_str, user_str],
            )?;
            Ok(StatusStep::Done)
          }
          Some(_) => Ok(StatusStep::NotPending),
        }
      })
      .await?;

    match step {
      StatusStep::NotFound => Err(Error::SubmissionNotFound(submission_id)),
      StatusStep::NotPending => Err(Error::SubmissionNotPending(submission_id)),
      StatusStep::Done => Ok(()),
    }
  }

  // ── Administrative overrides ──────────────────────────────────────────────

  async fn approve_submission(&self, id: Uuid) -> Result<Merchant> {
    let sub_str      = encode_uuid(id);
    let now          = Utc::now();
    let now_str      = encode_dt(now);
    let merchant_id  = Uuid::new_v4();
    let merchant_str = encode_uuid(merchant_id);

    let step = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let row: Option<(String, String, Option<String>, Option<f64>, Option<f64>, String)> =
          tx.query_row(
            "SELECT name, address, category, lat, lng, status
             FROM submissions WHERE submission_id = ?1",
            rusqlite::params![sub_str],
            |r| {
              Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?, r.get(5)?))
            },
          )
          .optional()?;

        let (name, address, category, lat, lng, status) = match row {
          Some(r) => r,
          None    => return Ok(ApproveStep::NotFound),
        };
        if status != "pending" {
          return Ok(ApproveStep::NotPending);
        }

        promote_in_tx(&tx, &sub_str, &merchant_str, &now_str)?;
        tx.commit()?;

        Ok(ApproveStep::Approved { name, address, category, lat, lng })
      })
      .await?;

    match step {
      ApproveStep::NotFound => Err(Error::SubmissionNotFound(id)),
      ApproveStep::NotPending => Err(Error::SubmissionNotPending(id)),
      ApproveStep::Approved { name, address, category, lat, lng } => Ok(Merchant {
        merchant_id,
        name,
        address,
        road_address: None,
        market_name: None,
        phone: None,
        category,
        coords: match (lat, lng) {
          (Some(lat), Some(lng)) => Coordinates { lat, lng },
          _ => Coordinates::UNGEOCODED,
        },
        pay: PayMethods::default(),
        created_at: now,
      }),
    }
  }

  async fn reject_submission(&self, id: Uuid) -> Result<()> {
    let sub_str = encode_uuid(id);

    let step = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE submissions SET status = 'rejected'
           WHERE submission_id = ?1 AND status = 'pending'",
          rusqlite::params![sub_str],
        )?;
        if changed == 1 {
          return Ok(StatusStep::Done);
        }

        let exists: bool = conn
          .query_row(
            "SELECT 1 FROM submissions WHERE submission_id = ?1",
            rusqlite::params![sub_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);

        if exists {
          Ok(StatusStep::NotPending)
        } else {
          Ok(StatusStep::NotFound)
        }
      })
      .await?;

    match step {
      StatusStep::NotFound => Err(Error::SubmissionNotFound(id)),
      StatusStep::NotPending => Err(Error::SubmissionNotPending(id)),
      StatusStep::Done => Ok(()),
    }
  }

  async fn delete_submission(&self, id: Uuid) -> Result<()> {
    let sub_str = encode_uuid(id);

    // Confirmation rows go with the submission (ON DELETE CASCADE).
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM submissions WHERE submission_id = ?1",
          rusqlite::params![sub_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::SubmissionNotFound(id));
    }
    Ok(())
  }

  async fn reconcile_submissions(&self) -> Result<Vec<Uuid>> {
    let fixed: Vec<String> = self
      .conn
      .call(|conn| {
        let tx = conn.transaction()?;

        // A pending submission that already has a directory entry with the
        // same name and address is the footprint of a half-completed
        // promotion; finish the status flip without a second merchant.
        let ids: Vec<String> = tx
          .prepare(
            "SELECT s.submission_id
             FROM submissions s
             JOIN merchants m ON m.name = s.name AND m.address = s.address
             WHERE s.status = 'pending'",
          )?
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        for id in &ids {
          tx.execute(
            "UPDATE submissions SET status = 'approved' WHERE submission_id = ?1",
            rusqlite::params![id],
          )?;
        }

        tx.commit()?;
        Ok(ids)
      })
      .await?;

    fixed.iter().map(|s| decode_uuid(s)).collect()
  }

  // ── Reviews ───────────────────────────────────────────────────────────────

  async fn add_review(&self, input: NewReview) -> Result<Review> {
    input.validate().map_err(Error::Core)?;

    let review = Review {
      review_id:    Uuid::new_v4(),
      merchant_id:  input.merchant_id,
      author_id:    input.author_id,
      content:      input.content,
      rating:       input.rating,
      voucher_ok:   input.voucher_ok,
      voucher_type: input.voucher_type,
      min_spend:    input.min_spend,
      image_url:    input.image_url,
      created_at:   Utc::now(),
    };

    let id_str       = encode_uuid(review.review_id);
    let merchant_str = encode_uuid(review.merchant_id);
    let author_str   = encode_uuid(review.author_id);
    let at_str       = encode_dt(review.created_at);
    let content      = review.content.clone();
    let rating       = review.rating;
    let voucher_ok   = review.voucher_ok;
    let voucher_str  = review.voucher_type.map(encode_voucher_type);
    let min_spend    = review.min_spend;
    let image_url    = review.image_url.clone();

    let outcome = self
      .conn
      .call(move |conn| {
        Ok(classify_insert(conn.execute(
          "INSERT INTO reviews
             (review_id, merchant_id, author_id, content, rating, voucher_ok,
              voucher_type, min_spend, image_url, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
          rusqlite::params![
            id_str,
            merchant_str,
            author_str,
            content,
            rating,
            voucher_ok,
            voucher_str,
            min_spend,
            image_url,
            at_str,
          ],
        ))?)
      })
      .await?;

    match outcome {
      WriteOutcome::MissingParent => Err(Error::MerchantNotFound(review.merchant_id)),
      _ => Ok(review),
    }
  }

  async fn list_reviews(&self, merchant_id: Uuid) -> Result<Vec<Review>> {
    let merchant_str = encode_uuid(merchant_id);

    let raws: Vec<RawReview> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT review_id, merchant_id, author_id, content, rating, voucher_ok,
                  voucher_type, min_spend, image_url, created_at
           FROM reviews WHERE merchant_id = ?1
           ORDER BY created_at DESC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![merchant_str], |row| {
            Ok(RawReview {
              review_id:    row.get(0)?,
              merchant_id:  row.get(1)?,
              author_id:    row.get(2)?,
              content:      row.get(3)?,
              rating:       row.get(4)?,
              voucher_ok:   row.get(5)?,
              voucher_type: row.get(6)?,
              min_spend:    row.get(7)?,
              image_url:    row.get(8)?,
              created_at:   row.get(9)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawReview::into_review).collect()
  }

  async fn delete_review(&self, review_id: Uuid, acting_user: Uuid) -> Result<()> {
    let id_str     = encode_uuid(review_id);
    let acting_str = encode_uuid(acting_user);

    let author: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT author_id FROM reviews WHERE review_id = ?1",
            rusqlite::params![id_str],
            |r| r.get(0),
          )
          .optional()?)
      })
      .await?;

    match author {
      None => Err(Error::ReviewNotFound(review_id)),
      Some(a) if a != acting_str => Err(Error::NotReviewAuthor(acting_user)),
      Some(_) => {
        let id_str = encode_uuid(review_id);
        self
          .conn
          .call(move |conn| {
            conn.execute(
              "DELETE FROM reviews WHERE review_id = ?1",
              rusqlite::params![id_str],
            )?;
            Ok(())
          })
          .await?;
        Ok(())
      }
    }
  }

  async fn review_stats(&self, merchant_id: Uuid) -> Result<ReviewStats> {
    let merchant_str = encode_uuid(merchant_id);

    let (count, average, ratio): (u32, Option<f64>, Option<f64>) = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*), AVG(rating), AVG(voucher_ok)
           FROM reviews WHERE merchant_id = ?1",
          rusqlite::params![merchant_str],
          |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )?)
      })
      .await?;

    Ok(ReviewStats {
      review_count:   count,
      average_rating: average,
      usable_percent: ratio.map(|r| (r * 100.0).round() as u8),
    })
  }

  // ── Review likes ──────────────────────────────────────────────────────────

  async fn like_review(&self, user_id: Uuid, review_id: Uuid) -> Result<()> {
    let user_str   = encode_uuid(user_id);
    let review_str = encode_uuid(review_id);
    let at_str     = encode_dt(Utc::now());

    let outcome = self
      .conn
      .call(move |conn| {
        Ok(classify_insert(conn.execute(
          "INSERT INTO review_likes (review_id, user_id, created_at)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![review_str, user_str, at_str],
        ))?)
      })
      .await?;

    match outcome {
      WriteOutcome::Done => Ok(()),
      WriteOutcome::DuplicateRow => Err(Error::DuplicateLike { user_id, review_id }),
      WriteOutcome::MissingParent => Err(Error::ReviewNotFound(review_id)),
    }
  }

  async fn unlike_review(&self, user_id: Uuid, review_id: Uuid) -> Result<()> {
    let user_str   = encode_uuid(user_id);
    let review_str = encode_uuid(review_id);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM review_likes WHERE review_id = ?1 AND user_id = ?2",
          rusqlite::params![review_str, user_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn like_tallies(
    &self,
    review_ids: Vec<Uuid>,
    viewer: Option<Uuid>,
  ) -> Result<Vec<LikeTally>> {
    if review_ids.is_empty() {
      return Ok(Vec::new());
    }

    let id_strs: Vec<String> = review_ids.iter().copied().map(encode_uuid).collect();
    let viewer_str = viewer.map(encode_uuid);

    let (counts, viewer_rows): (Vec<(String, u32)>, Vec<String>) = self
      .conn
      .call(move |conn| {
        let placeholders = vec!["?"; id_strs.len()].join(", ");

        let counts = conn
          .prepare(&format!(
            "SELECT review_id, COUNT(*) FROM review_likes
             WHERE review_id IN ({placeholders})
             GROUP BY review_id"
          ))?
          .query_map(rusqlite::params_from_iter(id_strs.iter()), |row| {
            Ok((row.get(0)?, row.get(1)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let viewer_rows = if let Some(v) = viewer_str {
          conn
            .prepare(&format!(
              "SELECT review_id FROM review_likes
               WHERE user_id = ? AND review_id IN ({placeholders})"
            ))?
            .query_map(
              rusqlite::params_from_iter(
                std::iter::once(v).chain(id_strs.iter().cloned()),
              ),
              |row| row.get(0),
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          Vec::new()
        };

        Ok((counts, viewer_rows))
      })
      .await?;

    let count_map: HashMap<String, u32> = counts.into_iter().collect();
    let liked: HashSet<String> = viewer_rows.into_iter().collect();

    Ok(
      review_ids
        .into_iter()
        .map(|id| {
          let key = encode_uuid(id);
          LikeTally {
            review_id:    id,
            likes:        count_map.get(&key).copied().unwrap_or(0),
            viewer_liked: liked.contains(&key),
          }
        })
        .collect(),
    )
  }

  // ── Favorites ─────────────────────────────────────────────────────────────

  async fn add_favorite(&self, user_id: Uuid, merchant_id: Uuid) -> Result<()> {
    let user_str     = encode_uuid(user_id);
    let merchant_str = encode_uuid(merchant_id);
    let at_str       = encode_dt(Utc::now());

    let outcome = self
      .conn
      .call(move |conn| {
        Ok(classify_insert(conn.execute(
          "INSERT INTO favorites (user_id, merchant_id, created_at)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![user_str, merchant_str, at_str],
        ))?)
      })
      .await?;

    match outcome {
      WriteOutcome::Done => Ok(()),
      WriteOutcome::DuplicateRow => {
        Err(Error::DuplicateFavorite { user_id, merchant_id })
      }
      WriteOutcome::MissingParent => Err(Error::MerchantNotFound(merchant_id)),
    }
  }

  async fn remove_favorite(&self, user_id: Uuid, merchant_id: Uuid) -> Result<()> {
    let user_str     = encode_uuid(user_id);
    let merchant_str = encode_uuid(merchant_id);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM favorites WHERE user_id = ?1 AND merchant_id = ?2",
          rusqlite::params![user_str, merchant_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn is_favorite(&self, user_id: Uuid, merchant_id: Uuid) -> Result<bool> {
    let user_str     = encode_uuid(user_id);
    let merchant_str = encode_uuid(merchant_id);

    let found: bool = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM favorites WHERE user_id = ?1 AND merchant_id = ?2",
              rusqlite::params![user_str, merchant_str],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;

    Ok(found)
  }

  async fn list_favorites(&self, user_id: Uuid) -> Result<Vec<Merchant>> {
    let user_str = encode_uuid(user_id);

    let raws: Vec<RawMerchant> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT m.merchant_id, m.name, m.address, m.road_address, m.market_name,
                  m.phone, m.category, m.lat, m.lng, m.paper, m.card, m.mobile,
                  m.created_at
           FROM favorites f
           JOIN merchants m ON m.merchant_id = f.merchant_id
           WHERE f.user_id = ?1
           ORDER BY f.created_at DESC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![user_str], |row| {
            Ok(RawMerchant {
              merchant_id:  row.get(0)?,
              name:         row.get(1)?,
              address:      row.get(2)?,
              road_address: row.get(3)?,
              market_name:  row.get(4)?,
              phone:        row.get(5)?,
              category:     row.get(6)?,
              lat:          row.get(7)?,
              lng:          row.get(8)?,
              paper:        row.get(9)?,
              card:         row.get(10)?,
              mobile:       row.get(11)?,
              created_at:   row.get(12)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMerchant::into_merchant).collect()
  }

  // ── Closure reports ───────────────────────────────────────────────────────

  async fn report_closure(
    &self,
    reporter_id: Uuid,
    merchant_id: Uuid,
    status: ReportStatus,
  ) -> Result<ClosureReport> {
    let report = ClosureReport {
      report_id: Uuid::new_v4(),
      merchant_id,
      reporter_id,
      status,
      created_at: Utc::now(),
    };

    let id_str       = encode_uuid(report.report_id);
    let merchant_str = encode_uuid(merchant_id);
    let reporter_str = encode_uuid(reporter_id);
    let status_str   = encode_report_status(status).to_owned();
    let at_str       = encode_dt(report.created_at);

    let outcome = self
      .conn
      .call(move |conn| {
        Ok(classify_insert(conn.execute(
          "INSERT INTO reports (report_id, merchant_id, reporter_id, status, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, merchant_str, reporter_str, status_str, at_str],
        ))?)
      })
      .await?;

    match outcome {
      WriteOutcome::Done => Ok(report),
      WriteOutcome::DuplicateRow => {
        Err(Error::DuplicateReport { merchant_id, reporter_id })
      }
      WriteOutcome::MissingParent => Err(Error::MerchantNotFound(merchant_id)),
    }
  }

  async fn recent_reports(&self, merchant_id: Uuid) -> Result<Vec<ClosureReport>> {
    let merchant_str = encode_uuid(merchant_id);
    let window       = REPORT_WINDOW as i64;

    let raws: Vec<RawReport> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT report_id, merchant_id, reporter_id, status, created_at
           FROM reports WHERE merchant_id = ?1
           ORDER BY created_at DESC, report_id
           LIMIT ?2",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![merchant_str, window], |row| {
            Ok(RawReport {
              report_id:   row.get(0)?,
              merchant_id: row.get(1)?,
              reporter_id: row.get(2)?,
              status:      row.get(3)?,
              created_at:  row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawReport::into_report).collect()
  }
}
