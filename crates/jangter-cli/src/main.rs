//! `jangter` — operator command line for the jangter directory server.
//!
//! # Usage
//!
//! ```
//! jangter --url http://localhost:8321 --admin-user admin --admin-password secret submissions
//! jangter --config ~/.config/jangter/config.toml approve <id>
//! ```

mod client;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use jangter_core::submission::SubmissionStatus;
use serde::Deserialize;
use uuid::Uuid;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "jangter", about = "Operator tool for the jangter directory server")]
struct Args {
  /// Path to a TOML config file (url, admin_username, admin_password).
  #[arg(short, long, value_name = "FILE")]
  config: Option<std::path::PathBuf>,

  /// Base URL of the jangter server (default: http://localhost:8321).
  #[arg(long, env = "JANGTER_URL")]
  url: Option<String>,

  /// Administrator username.
  #[arg(long, env = "JANGTER_ADMIN_USER")]
  admin_user: Option<String>,

  /// Administrator password (plaintext).
  #[arg(long, env = "JANGTER_ADMIN_PASSWORD")]
  admin_password: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// List submissions, optionally restricted to one status.
  Submissions {
    #[arg(long, value_name = "pending|approved|rejected")]
    status: Option<String>,
  },
  /// Promote a submission into the directory regardless of votes.
  Approve { id: Uuid },
  /// Reject a pending submission (terminal).
  Reject { id: Uuid },
  /// Delete a submission; its confirmations are cascade-deleted.
  Delete { id: Uuid },
  /// Mark pending submissions that already have a directory entry as
  /// approved.
  Reconcile,
  /// Search the merchant directory by name or address.
  Search { text: String },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:            String,
  #[serde(default)]
  admin_username: String,
  #[serde(default)]
  admin_password: String,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  // Load config file if provided.
  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url: args
      .url
      .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
      .unwrap_or_else(|| "http://localhost:8321".to_string()),
    admin_username: args
      .admin_user
      .or_else(|| {
        (!file_cfg.admin_username.is_empty())
          .then(|| file_cfg.admin_username.clone())
      })
      .unwrap_or_default(),
    admin_password: args
      .admin_password
      .or_else(|| {
        (!file_cfg.admin_password.is_empty())
          .then(|| file_cfg.admin_password.clone())
      })
      .unwrap_or_default(),
  };

  let client = ApiClient::new(api_config)?;

  match args.command {
    Command::Submissions { status } => list_submissions(&client, status.as_deref()).await,
    Command::Approve { id } => approve(&client, id).await,
    Command::Reject { id } => {
      client.reject(id).await?;
      println!("rejected {id}");
      Ok(())
    }
    Command::Delete { id } => {
      client.delete(id).await?;
      println!("deleted {id}");
      Ok(())
    }
    Command::Reconcile => reconcile(&client).await,
    Command::Search { text } => search(&client, &text).await,
  }
}

// ─── Commands ─────────────────────────────────────────────────────────────────

fn status_label(status: SubmissionStatus) -> &'static str {
  match status {
    SubmissionStatus::Pending => "pending",
    SubmissionStatus::Approved => "approved",
    SubmissionStatus::Rejected => "rejected",
  }
}

async fn list_submissions(client: &ApiClient, status: Option<&str>) -> Result<()> {
  let submissions = client.list_submissions(status).await?;

  if submissions.is_empty() {
    println!("no submissions");
    return Ok(());
  }

  for s in submissions {
    println!(
      "{}  [{}]  {}  —  {}",
      s.submission_id,
      status_label(s.status),
      s.name,
      s.address,
    );
    if let Some(note) = &s.note {
      println!("    note: {note}");
    }
  }
  Ok(())
}

async fn approve(client: &ApiClient, id: Uuid) -> Result<()> {
  let merchant = client.approve(id).await?;
  println!("approved {id}");
  println!("merchant {}  {}  —  {}", merchant.merchant_id, merchant.name, merchant.address);
  if merchant.coords.is_ungeocoded() {
    println!("    coordinates pending geocoding");
  }
  Ok(())
}

async fn reconcile(client: &ApiClient) -> Result<()> {
  let fixed = client.reconcile().await?;
  if fixed.is_empty() {
    println!("nothing to reconcile");
  } else {
    for id in fixed {
      println!("approved {id}");
    }
  }
  Ok(())
}

async fn search(client: &ApiClient, text: &str) -> Result<()> {
  let page = client.search(text).await?;

  println!("{} match(es)", page.total);
  for entry in page.merchants {
    let m = &entry.merchant;
    println!("{}  {}  —  {}", m.merchant_id, m.name, m.address);
    if entry.stats.review_count > 0 {
      println!(
        "    {} review(s), avg {:.1}",
        entry.stats.review_count,
        entry.stats.average_rating.unwrap_or(0.0),
      );
    }
  }
  Ok(())
}
