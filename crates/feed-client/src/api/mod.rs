//! Back-office REST client.
//!
//! Covers the request/response collaborators around the feed: the initial
//! unread count, bulk mark-as-read, and the pre-aggregated dashboard
//! snapshot. Responses are consumed as delivered; no client-side
//! aggregation happens here.

pub mod models;
pub mod weather;

pub use models::{ComplianceStats, DashboardData, DashboardSnapshot, MarkReadAck};

use chrono::Utc;

use crate::FeedError;

/// REST client for the payments back office.
pub struct BackofficeClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackofficeClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Number of unread payment notifications for the current user.
    pub async fn unread_count(&self) -> Result<u64, FeedError> {
        let body = self.get("/payments/notifications/unread_count").await?;
        let unread: models::UnreadCount = serde_json::from_str(&body)?;
        Ok(unread.count)
    }

    /// Mark every notification read. The refreshed count arrives over the
    /// push channel, not in this response.
    pub async fn mark_all_read(&self) -> Result<MarkReadAck, FeedError> {
        let body = self.post("/payments/notifications/mark_all_read").await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Fetch the pre-aggregated dashboard statistics in one call.
    pub async fn dashboard_snapshot(&self) -> Result<DashboardSnapshot, FeedError> {
        let body = self.get("/payments/dashboard/data").await?;
        let data: DashboardData = serde_json::from_str(&body)?;
        Ok(DashboardSnapshot {
            fetched_at: Utc::now(),
            data,
        })
    }

    async fn get(&self, path: &str) -> Result<String, FeedError> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self.http.get(&url).send().await?;
        Self::read_body(resp).await
    }

    async fn post(&self, path: &str) -> Result<String, FeedError> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self.http.post(&url).send().await?;
        Self::read_body(resp).await
    }

    async fn read_body(resp: reqwest::Response) -> Result<String, FeedError> {
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(FeedError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }
        Ok(body)
    }
}
