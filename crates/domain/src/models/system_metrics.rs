//! Read-only operational projections: system metrics, SLA metrics and incidents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default number of metric samples returned.
pub const DEFAULT_METRIC_LIMIT: i64 = 100;

/// Largest number of metric samples a caller may request.
pub const MAX_METRIC_LIMIT: i64 = 1000;

string_enum! {
    IncidentSeverity {
        Low => "low",
        Medium => "medium",
        High => "high",
        Critical => "critical",
    }
}

string_enum! {
    IncidentStatus {
        Investigating => "investigating",
        Identified => "identified",
        Monitoring => "monitoring",
        Resolved => "resolved",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemMetric {
    pub id: Uuid,
    pub name: String,
    pub value: f64,
    pub unit: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlaMetric {
    pub id: Uuid,
    pub name: String,
    pub target: f64,
    pub actual: f64,
    pub period: String,
    pub timestamp: DateTime<Utc>,
}

impl SlaMetric {
    /// Whether the measured value meets the target.
    pub fn is_met(&self) -> bool {
        self.actual >= self.target
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentReport {
    pub id: Uuid,
    pub title: String,
    pub severity: IncidentSeverity,
    pub status: IncidentStatus,
    pub description: Option<String>,
    pub started_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Filters for system metric samples.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemMetricsQuery {
    pub name: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
}

impl SystemMetricsQuery {
    /// Requested limit clamped to 1..=MAX_METRIC_LIMIT.
    pub fn effective_limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_METRIC_LIMIT)
            .clamp(1, MAX_METRIC_LIMIT)
    }
}
