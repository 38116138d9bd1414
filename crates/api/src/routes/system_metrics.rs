//! Operational metrics routes. Read-only.

use axum::{extract::State, routing::get, Router};
use domain::models::{IncidentReport, IncidentStatus, SlaMetric, SystemMetric, SystemMetricsQuery};
use serde::Deserialize;

use super::Envelope;
use crate::app::AppState;
use crate::extractors::QueryParams;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/system", get(list_system_metrics))
        .route("/sla", get(list_sla_metrics))
        .route("/incidents", get(list_incident_reports))
}

#[derive(Debug, Default, Deserialize)]
pub struct SlaQuery {
    pub period: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct IncidentQuery {
    pub status: Option<IncidentStatus>,
}

pub async fn list_system_metrics(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<SystemMetricsQuery>,
) -> Envelope<Vec<SystemMetric>> {
    Envelope::ok(state.services.metrics.get_system_metrics(&query).await)
}

/// `GET /metrics/sla?period=` (e.g. `2026-09`)
pub async fn list_sla_metrics(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<SlaQuery>,
) -> Envelope<Vec<SlaMetric>> {
    Envelope::ok(
        state
            .services
            .metrics
            .get_sla_metrics(query.period.as_deref())
            .await,
    )
}

pub async fn list_incident_reports(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<IncidentQuery>,
) -> Envelope<Vec<IncidentReport>> {
    Envelope::ok(state.services.metrics.get_incident_reports(query.status).await)
}
