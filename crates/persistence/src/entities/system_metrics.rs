//! System metric, SLA metric and incident report entities.

use chrono::{DateTime, Utc};
use domain::models::{IncidentReport, SlaMetric, SystemMetric};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::parse_column;
use crate::error::DecodeError;

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct SystemMetricEntity {
    pub id: Uuid,
    pub name: String,
    pub value: f64,
    pub unit: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl From<SystemMetricEntity> for SystemMetric {
    fn from(entity: SystemMetricEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            value: entity.value,
            unit: entity.unit,
            timestamp: entity.timestamp,
        }
    }
}

impl From<&SystemMetric> for SystemMetricEntity {
    fn from(metric: &SystemMetric) -> Self {
        Self {
            id: metric.id,
            name: metric.name.clone(),
            value: metric.value,
            unit: metric.unit.clone(),
            timestamp: metric.timestamp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct SlaMetricEntity {
    pub id: Uuid,
    pub name: String,
    pub target: f64,
    pub actual: f64,
    pub period: String,
    pub timestamp: DateTime<Utc>,
}

impl From<SlaMetricEntity> for SlaMetric {
    fn from(entity: SlaMetricEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            target: entity.target,
            actual: entity.actual,
            period: entity.period,
            timestamp: entity.timestamp,
        }
    }
}

impl From<&SlaMetric> for SlaMetricEntity {
    fn from(metric: &SlaMetric) -> Self {
        Self {
            id: metric.id,
            name: metric.name.clone(),
            target: metric.target,
            actual: metric.actual,
            period: metric.period.clone(),
            timestamp: metric.timestamp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct IncidentReportEntity {
    pub id: Uuid,
    pub title: String,
    pub severity: String,
    pub status: String,
    pub description: Option<String>,
    pub started_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl TryFrom<IncidentReportEntity> for IncidentReport {
    type Error = DecodeError;

    fn try_from(entity: IncidentReportEntity) -> Result<Self, Self::Error> {
        Ok(Self {
            id: entity.id,
            title: entity.title,
            severity: parse_column(&entity.severity)?,
            status: parse_column(&entity.status)?,
            description: entity.description,
            started_at: entity.started_at,
            resolved_at: entity.resolved_at,
        })
    }
}

impl From<&IncidentReport> for IncidentReportEntity {
    fn from(incident: &IncidentReport) -> Self {
        Self {
            id: incident.id,
            title: incident.title.clone(),
            severity: incident.severity.as_str().to_string(),
            status: incident.status.as_str().to_string(),
            description: incident.description.clone(),
            started_at: incident.started_at,
            resolved_at: incident.resolved_at,
        }
    }
}
