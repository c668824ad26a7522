use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Headline compliance numbers rendered on the dashboard tiles.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComplianceStats {
    #[serde(default)]
    pub total_payments: u64,
    #[serde(default)]
    pub underpaid_count: u64,
    #[serde(default)]
    pub overpaid_count: u64,
}

/// Pre-aggregated dashboard payload.
///
/// Only the compliance tile is typed; the chart sections are rendered
/// verbatim by the frontend and stay opaque here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardData {
    #[serde(default)]
    pub compliance_stats: ComplianceStats,
    #[serde(default)]
    pub payment_status: Value,
    #[serde(default)]
    pub collections: Value,
    #[serde(default)]
    pub plan_distribution: Value,
    #[serde(default)]
    pub outstanding_by_duration: Value,
}

/// Dashboard payload together with the time it was fetched.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub fetched_at: DateTime<Utc>,
    pub data: DashboardData,
}

/// Ack returned by the bulk mark-as-read call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkReadAck {
    #[serde(default)]
    pub marked: u64,
}

#[derive(Debug, Deserialize)]
pub(super) struct UnreadCount {
    #[serde(default)]
    pub count: u64,
}
