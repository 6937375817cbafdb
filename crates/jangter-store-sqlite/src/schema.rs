//! SQL schema for the jangter SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS merchants (
    merchant_id  TEXT PRIMARY KEY,
    name         TEXT NOT NULL,
    address      TEXT NOT NULL,    -- lot-number address as submitted
    road_address TEXT,             -- filled in by the geocoding batch job
    market_name  TEXT,
    phone        TEXT,
    category     TEXT,
    lat          REAL NOT NULL DEFAULT 0,  -- (0, 0) means not yet geocoded
    lng          REAL NOT NULL DEFAULT 0,
    paper        INTEGER NOT NULL DEFAULT 0,
    card         INTEGER NOT NULL DEFAULT 0,
    mobile       INTEGER NOT NULL DEFAULT 0,
    created_at   TEXT NOT NULL     -- ISO 8601 UTC; server-assigned
);

CREATE TABLE IF NOT EXISTS submissions (
    submission_id TEXT PRIMARY KEY,
    proposer_id   TEXT NOT NULL,
    name          TEXT NOT NULL,
    address       TEXT NOT NULL,
    category      TEXT,
    note          TEXT,
    lat           REAL,            -- NULL when the proposer had no coordinates
    lng           REAL,
    status        TEXT NOT NULL DEFAULT 'pending',  -- 'pending' | 'approved' | 'rejected'
    created_at    TEXT NOT NULL
);

-- The confirmation ledger. Quorum counts are always recomputed from these
-- rows, never read from a cached counter. The composite key enforces at
-- most one vote per (submission, user).
CREATE TABLE IF NOT EXISTS confirmations (
    submission_id TEXT NOT NULL REFERENCES submissions(submission_id) ON DELETE CASCADE,
    user_id       TEXT NOT NULL,
    created_at    TEXT NOT NULL,
    PRIMARY KEY (submission_id, user_id)
);

CREATE TABLE IF NOT EXISTS reviews (
    review_id    TEXT PRIMARY KEY,
    merchant_id  TEXT NOT NULL REFERENCES merchants(merchant_id) ON DELETE CASCADE,
    author_id    TEXT NOT NULL,
    content      TEXT NOT NULL,
    rating       INTEGER NOT NULL,  -- 1..=5, validated before insert
    voucher_ok   INTEGER NOT NULL,
    voucher_type TEXT,              -- 'paper' | 'card' | 'mobile'
    min_spend    INTEGER,
    image_url    TEXT,
    created_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS review_likes (
    review_id  TEXT NOT NULL REFERENCES reviews(review_id) ON DELETE CASCADE,
    user_id    TEXT NOT NULL,
    created_at TEXT NOT NULL,
    PRIMARY KEY (review_id, user_id)
);

CREATE TABLE IF NOT EXISTS favorites (
    user_id     TEXT NOT NULL,
    merchant_id TEXT NOT NULL REFERENCES merchants(merchant_id) ON DELETE CASCADE,
    created_at  TEXT NOT NULL,
    PRIMARY KEY (user_id, merchant_id)
);

CREATE TABLE IF NOT EXISTS reports (
    report_id   TEXT PRIMARY KEY,
    merchant_id TEXT NOT NULL REFERENCES merchants(merchant_id) ON DELETE CASCADE,
    reporter_id TEXT NOT NULL,
    status      TEXT NOT NULL,      -- 'open' | 'closed' | 'no_voucher'
    created_at  TEXT NOT NULL,
    UNIQUE (merchant_id, reporter_id)
);

CREATE INDEX IF NOT EXISTS submissions_status_idx ON submissions(status);
CREATE INDEX IF NOT EXISTS reviews_merchant_idx   ON reviews(merchant_id);
CREATE INDEX IF NOT EXISTS reports_merchant_idx   ON reports(merchant_id);
CREATE INDEX IF NOT EXISTS favorites_user_idx     ON favorites(user_id);
CREATE INDEX IF NOT EXISTS merchants_name_idx     ON merchants(name);

PRAGMA user_version = 1;
";
