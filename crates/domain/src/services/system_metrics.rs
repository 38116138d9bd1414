//! Read-only operational metrics.

use std::sync::Arc;

use crate::models::{
    ApiResponse, IncidentReport, IncidentStatus, SlaMetric, SystemMetric, SystemMetricsQuery,
};
use crate::store::MetricsStore;

#[derive(Clone)]
pub struct SystemMetricsApi {
    store: Arc<dyn MetricsStore>,
}

impl SystemMetricsApi {
    pub fn new(store: Arc<dyn MetricsStore>) -> Self {
        Self { store }
    }

    pub async fn get_system_metrics(&self, query: &SystemMetricsQuery) -> ApiResponse<Vec<SystemMetric>> {
        ApiResponse::from_list_result(
            self.store.list_system_metrics(query).await,
            "Failed to load system metrics",
        )
    }

    pub async fn get_sla_metrics(&self, period: Option<&str>) -> ApiResponse<Vec<SlaMetric>> {
        ApiResponse::from_list_result(
            self.store.list_sla_metrics(period).await,
            "Failed to load SLA metrics",
        )
    }

    pub async fn get_incident_reports(
        &self,
        status: Option<IncidentStatus>,
    ) -> ApiResponse<Vec<IncidentReport>> {
        ApiResponse::from_list_result(
            self.store.list_incident_reports(status).await,
            "Failed to load incident reports",
        )
    }
}
