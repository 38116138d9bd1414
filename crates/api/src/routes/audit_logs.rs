//! Audit log routes.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use domain::models::{AuditLog, CreateAuditLogInput, ListAuditLogsQuery};
use domain::services::DeadLetter;

use super::Envelope;
use crate::app::AppState;
use crate::extractors::{JsonBody, QueryParams};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_audit_logs).post(create_audit_log))
        .route("/dead-letters", get(list_dead_letters))
}

/// `GET /audit-logs`
///
/// A plain list by default; with `page` or `perPage` the data carries
/// pagination metadata as well.
pub async fn list_audit_logs(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ListAuditLogsQuery>,
) -> Response {
    let audit = &state.services.audit;
    if query.page.is_some() || query.per_page.is_some() {
        Envelope::ok(audit.get_audit_log_page(&query).await).into_response()
    } else {
        Envelope::ok(audit.get_audit_logs(&query).await).into_response()
    }
}

pub async fn create_audit_log(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateAuditLogInput>,
) -> Envelope<AuditLog> {
    Envelope::created(state.services.audit.create_audit_log(input).await)
}

pub async fn list_dead_letters(State(state): State<AppState>) -> Envelope<Vec<DeadLetter>> {
    Envelope::ok(state.services.audit.dead_letters())
}
