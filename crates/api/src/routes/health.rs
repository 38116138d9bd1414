//! Health check endpoint handlers.

use axum::{
    extract::State,
    http::{StatusCode, Uri},
    Json,
};
use serde::Serialize;

use crate::app::AppState;
use crate::config::Backend;
use crate::error::ApiError;

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub backend: Backend,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<DatabaseHealth>,
    pub audit_dead_letters: usize,
}

/// Database health status.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseHealth {
    pub connected: bool,
    pub latency_ms: Option<u64>,
}

/// Simple status response for liveness/readiness probes.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    fn new(status: &str) -> Self {
        Self {
            status: status.to_string(),
        }
    }
}

/// Full health check endpoint.
///
/// The database is probed only with the PostgreSQL backend.
pub async fn health_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let database = match state.pool {
        Some(ref pool) => {
            let start = std::time::Instant::now();
            let connected = persistence::db::ping(pool).await.is_ok();
            let latency_ms = start.elapsed().as_millis() as u64;
            Some(DatabaseHealth {
                connected,
                latency_ms: connected.then_some(latency_ms),
            })
        }
        None => None,
    };

    let healthy = database.as_ref().map_or(true, |db| db.connected);
    let response = HealthResponse {
        status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend: state.config.database.backend,
        database,
        audit_dead_letters: state.audit.dead_letters().len(),
    };

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(response))
}

/// Liveness probe endpoint.
///
/// Returns 200 OK if the process is running.
pub async fn live() -> Json<StatusResponse> {
    Json(StatusResponse::new("alive"))
}

/// Readiness probe endpoint.
///
/// Returns 200 OK if the service can accept traffic. Records pool gauges on
/// each probe.
pub async fn ready(State(state): State<AppState>) -> Result<Json<StatusResponse>, StatusCode> {
    let Some(ref pool) = state.pool else {
        return Ok(Json(StatusResponse::new("ready")));
    };

    persistence::metrics::record_pool_metrics(pool);
    match persistence::db::ping(pool).await {
        Ok(()) => Ok(Json(StatusResponse::new("ready"))),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

/// Fallback for unknown paths.
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("No route for {}", uri.path()))
}
