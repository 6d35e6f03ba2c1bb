//! REST client for the remote report collection
//!
//! Speaks a PostgREST-style JSON API: rows are
//! `{id, venue_id, level, created_at}`, filters are query parameters
//! (`venue_id=eq.X`, `created_at=gt.T`). Inserts return the stored row via
//! `Prefer: return=representation`.

use crate::domain::types::{CrowdLevel, CrowdReport, VenueId};
use crate::io::store::ReportStore;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::time::Duration;

const REPORTS_TABLE: &str = "crowd_reports";

/// Connection settings for the remote store
#[derive(Debug, Clone)]
pub struct RestStoreConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_ms: u64,
}

/// Insert body; the server assigns id and created_at
#[derive(Debug, Serialize)]
struct InsertRow<'a> {
    venue_id: &'a VenueId,
    level: CrowdLevel,
}

pub struct RestReportStore {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl RestReportStore {
    pub fn new(config: &RestStoreConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .context("failed to build report store HTTP client")?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            client,
        })
    }

    fn table_url(&self) -> String {
        format!("{}/{}", self.base_url, REPORTS_TABLE)
    }

    fn with_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request
                .header("apikey", key)
                .header("Authorization", format!("Bearer {}", key)),
            None => request,
        }
    }
}

#[async_trait]
impl ReportStore for RestReportStore {
    async fn reports_since(
        &self,
        venue_id: &VenueId,
        since: DateTime<Utc>,
    ) -> Result<Vec<CrowdReport>> {
        let request = self.client.get(self.table_url()).query(&[
            ("venue_id", format!("eq.{}", venue_id)),
            ("created_at", format!("gt.{}", since.to_rfc3339_opts(SecondsFormat::Millis, true))),
            ("order", "created_at.desc".to_string()),
        ]);

        let response = self
            .with_auth(request)
            .send()
            .await
            .with_context(|| format!("report query failed for venue {}", venue_id))?
            .error_for_status()
            .context("report query returned error status")?;

        let reports: Vec<CrowdReport> =
            response.json().await.context("report query returned malformed rows")?;
        Ok(reports)
    }

    async fn insert_report(&self, venue_id: &VenueId, level: CrowdLevel) -> Result<CrowdReport> {
        let request = self
            .client
            .post(self.table_url())
            .header("Prefer", "return=representation")
            .json(&InsertRow { venue_id, level });

        let response = self
            .with_auth(request)
            .send()
            .await
            .with_context(|| format!("report insert failed for venue {}", venue_id))?
            .error_for_status()
            .context("report insert returned error status")?;

        let mut rows: Vec<CrowdReport> =
            response.json().await.context("report insert returned malformed row")?;
        match rows.pop() {
            Some(row) => Ok(row),
            None => bail!("report insert returned no row"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_row_wire_shape() {
        let venue = VenueId::from("7");
        let row = InsertRow { venue_id: &venue, level: CrowdLevel::Moderate };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json, serde_json::json!({"venue_id": "7", "level": "moderate"}));
    }

    #[test]
    fn test_wire_row_parses() {
        let json = r#"{
            "id": "0190a3c2-1111-7000-8000-000000000000",
            "venue_id": "3",
            "level": "busy",
            "created_at": "2025-06-01T11:55:00.000Z"
        }"#;
        let report: CrowdReport = serde_json::from_str(json).unwrap();
        assert_eq!(report.venue_id, VenueId::from("3"));
        assert_eq!(report.level, CrowdLevel::Busy);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let store = RestReportStore::new(&RestStoreConfig {
            base_url: "https://example.test/rest/v1/".to_string(),
            api_key: None,
            timeout_ms: 2000,
        })
        .unwrap();
        assert_eq!(store.table_url(), "https://example.test/rest/v1/crowd_reports");
    }
}
