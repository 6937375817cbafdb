//! Async HTTP client wrapping the jangter JSON API.

use anyhow::{Context, Result, anyhow};
use jangter_core::{
  merchant::Merchant,
  store::MerchantPage,
  submission::Submission,
};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use uuid::Uuid;

/// Connection settings for the jangter server.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url:       String,
  pub admin_username: String,
  pub admin_password: String,
}

/// Async HTTP client for the jangter JSON REST API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

#[derive(Debug, Deserialize)]
struct ReconcileOutcome {
  approved: Vec<Uuid>,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{path}", self.config.base_url.trim_end_matches('/'))
  }

  fn admin(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    req.basic_auth(&self.config.admin_username, Some(&self.config.admin_password))
  }

  // ── Admin: submissions ────────────────────────────────────────────────────

  /// `GET /admin/submissions[?status=...]`
  pub async fn list_submissions(&self, status: Option<&str>) -> Result<Vec<Submission>> {
    let mut req = self.admin(self.client.get(self.url("/admin/submissions")));
    if let Some(s) = status {
      req = req.query(&[("status", s)]);
    }

    let resp = req.send().await.context("GET /admin/submissions failed")?;
    if !resp.status().is_success() {
      return Err(anyhow!("GET /admin/submissions → {}", resp.status()));
    }
    resp.json().await.context("deserialising submissions")
  }

  /// `POST /admin/submissions/:id/approve`
  pub async fn approve(&self, id: Uuid) -> Result<Merchant> {
    let resp = self
      .admin(self.client.post(self.url(&format!("/admin/submissions/{id}/approve"))))
      .send()
      .await
      .context("POST approve failed")?;

    if !resp.status().is_success() {
      return Err(anyhow!("approve {id} → {}", resp.status()));
    }
    resp.json().await.context("deserialising merchant")
  }

  /// `POST /admin/submissions/:id/reject`
  pub async fn reject(&self, id: Uuid) -> Result<()> {
    let resp = self
      .admin(self.client.post(self.url(&format!("/admin/submissions/{id}/reject"))))
      .send()
      .await
      .context("POST reject failed")?;

    if !resp.status().is_success() {
      return Err(anyhow!("reject {id} → {}", resp.status()));
    }
    Ok(())
  }

  /// `DELETE /admin/submissions/:id`
  pub async fn delete(&self, id: Uuid) -> Result<()> {
    let resp = self
      .admin(self.client.delete(self.url(&format!("/admin/submissions/{id}"))))
      .send()
      .await
      .context("DELETE submission failed")?;

    if !resp.status().is_success() {
      return Err(anyhow!("delete {id} → {}", resp.status()));
    }
    Ok(())
  }

  /// `POST /admin/reconcile`
  pub async fn reconcile(&self) -> Result<Vec<Uuid>> {
    let resp = self
      .admin(self.client.post(self.url("/admin/reconcile")))
      .send()
      .await
      .context("POST /admin/reconcile failed")?;

    if !resp.status().is_success() {
      return Err(anyhow!("POST /admin/reconcile → {}", resp.status()));
    }
    let outcome: ReconcileOutcome =
      resp.json().await.context("deserialising reconcile outcome")?;
    Ok(outcome.approved)
  }

  // ── Public: directory search ──────────────────────────────────────────────

  /// `GET /api/merchants?search=<text>`
  pub async fn search(&self, text: &str) -> Result<MerchantPage> {
    let resp = self
      .client
      .get(self.url("/api/merchants"))
      .query(&[("search", text)])
      .send()
      .await
      .context("GET /api/merchants failed")?;

    if !resp.status().is_success() {
      return Err(anyhow!("GET /api/merchants → {}", resp.status()));
    }
    resp.json().await.context("deserialising merchants")
  }
}
