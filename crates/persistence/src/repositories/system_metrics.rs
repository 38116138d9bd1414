//! Read-only queries over system metrics, SLA metrics and incident reports.

use async_trait::async_trait;
use domain::models::{IncidentReport, IncidentStatus, SlaMetric, SystemMetric, SystemMetricsQuery};
use domain::store::{MetricsStore, StoreResult};
use sqlx::PgPool;

use crate::entities::{IncidentReportEntity, SlaMetricEntity, SystemMetricEntity};
use crate::error::PersistenceResult;
use crate::metrics::QueryTimer;

#[derive(Clone)]
pub struct SystemMetricsRepository {
    pool: PgPool,
}

impl SystemMetricsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn system_metrics(
        &self,
        query: &SystemMetricsQuery,
    ) -> PersistenceResult<Vec<SystemMetricEntity>> {
        let timer = QueryTimer::new("list_system_metrics");
        let rows = sqlx::query_as::<_, SystemMetricEntity>(
            r#"
            SELECT id, name, value, unit, timestamp
            FROM system_metrics
            WHERE ($1::text IS NULL OR name = $1)
              AND ($2::timestamptz IS NULL OR timestamp >= $2)
            ORDER BY timestamp DESC, id DESC
            LIMIT $3
            "#,
        )
        .bind(&query.name)
        .bind(query.since)
        .bind(query.effective_limit())
        .fetch_all(&self.pool)
        .await?;
        timer.record();
        Ok(rows)
    }

    pub async fn sla_metrics(&self, period: Option<&str>) -> PersistenceResult<Vec<SlaMetricEntity>> {
        let timer = QueryTimer::new("list_sla_metrics");
        let rows = sqlx::query_as::<_, SlaMetricEntity>(
            r#"
            SELECT id, name, target, actual, period, timestamp
            FROM sla_metrics
            WHERE ($1::text IS NULL OR period = $1)
            ORDER BY timestamp DESC, id DESC
            "#,
        )
        .bind(period)
        .fetch_all(&self.pool)
        .await?;
        timer.record();
        Ok(rows)
    }

    pub async fn incident_reports(
        &self,
        status: Option<IncidentStatus>,
    ) -> PersistenceResult<Vec<IncidentReportEntity>> {
        let timer = QueryTimer::new("list_incident_reports");
        let rows = sqlx::query_as::<_, IncidentReportEntity>(
            r#"
            SELECT id, title, severity, status, description, started_at, resolved_at
            FROM incident_reports
            WHERE ($1::text IS NULL OR status = $1)
            ORDER BY started_at DESC, id DESC
            "#,
        )
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;
        timer.record();
        Ok(rows)
    }
}

#[async_trait]
impl MetricsStore for SystemMetricsRepository {
    async fn list_system_metrics(&self, query: &SystemMetricsQuery) -> StoreResult<Vec<SystemMetric>> {
        let rows = self.system_metrics(query).await?;
        Ok(rows.into_iter().map(SystemMetric::from).collect())
    }

    async fn list_sla_metrics(&self, period: Option<&str>) -> StoreResult<Vec<SlaMetric>> {
        let rows = self.sla_metrics(period).await?;
        Ok(rows.into_iter().map(SlaMetric::from).collect())
    }

    async fn list_incident_reports(
        &self,
        status: Option<IncidentStatus>,
    ) -> StoreResult<Vec<IncidentReport>> {
        let rows = self.incident_reports(status).await?;
        Ok(rows
            .into_iter()
            .map(IncidentReport::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }
}
