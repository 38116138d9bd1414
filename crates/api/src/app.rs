use axum::{middleware, routing::get, Router};
use domain::services::{
    AccountManagerApi, AuditApi, AuditDispatcher, ComplianceApi, IntegrationApi, SupportApi,
    SystemMetricsApi,
};
use persistence::Stores;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, rate_limit_middleware, security_headers_middleware,
    trace_id, RateLimiterState,
};
use crate::routes::{
    account_managers, audit_logs, compliance, health, integrations, reference_data, support,
    system_metrics,
};

/// The data-access services, one per resource family.
#[derive(Clone)]
pub struct Services {
    pub support: SupportApi,
    pub account_managers: AccountManagerApi,
    pub integrations: IntegrationApi,
    pub compliance: ComplianceApi,
    pub audit: AuditApi,
    pub metrics: SystemMetricsApi,
}

impl Services {
    pub fn new(stores: &Stores, audit: AuditDispatcher) -> Self {
        Self {
            support: SupportApi::new(stores.support.clone()),
            account_managers: AccountManagerApi::new(stores.account_managers.clone()),
            integrations: IntegrationApi::new(stores.integrations.clone(), audit.clone()),
            compliance: ComplianceApi::new(stores.compliance.clone(), audit.clone()),
            audit: AuditApi::new(stores.audit.clone(), audit),
            metrics: SystemMetricsApi::new(stores.metrics.clone()),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub services: Arc<Services>,
    pub audit: AuditDispatcher,
    /// Present only with the PostgreSQL backend.
    pub pool: Option<PgPool>,
    pub rate_limiter: Option<Arc<RateLimiterState>>,
}

impl AppState {
    /// Wire services over `stores`. Spawns the audit worker, so it must be
    /// called inside a Tokio runtime.
    pub fn new(config: Config, stores: Stores, pool: Option<PgPool>) -> Self {
        let audit = AuditDispatcher::spawn(
            stores.audit.clone(),
            stores.integrations.clone(),
            config.audit.dead_letter_capacity,
        );
        let rate_limiter = RateLimiterState::new(config.security.rate_limit_per_minute).map(Arc::new);

        Self {
            services: Arc::new(Services::new(&stores, audit.clone())),
            config: Arc::new(config),
            audit,
            pool,
            rate_limiter,
        }
    }
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.security.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

pub fn create_app(state: AppState) -> Router {
    let config = state.config.clone();

    let v1 = Router::new()
        .nest("/support", support::router())
        .merge(account_managers::router())
        .nest("/integrations", integrations::router())
        .nest("/compliance", compliance::router())
        .nest("/audit-logs", audit_logs::router())
        .nest("/metrics", system_metrics::router())
        .route("/reference-data", get(reference_data::get_reference_data))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", v1)
        .fallback(health::not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            security_headers_middleware,
        ))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors_layer(&config))
        .with_state(state)
}
