//! Support ticket and agent routes.

use axum::{
    extract::State,
    routing::get,
    Router,
};
use domain::models::{CreateTicketInput, SupportAgent, SupportTicket};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::Envelope;
use crate::app::AppState;
use crate::extractors::{JsonBody, PathParam, QueryParams, UserQuery};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tickets", get(list_tickets).post(create_ticket))
        .route("/tickets/:id", get(get_ticket).patch(update_ticket))
        .route("/agents", get(list_agents))
}

/// `GET /support/tickets?userId=`
pub async fn list_tickets(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<UserQuery>,
) -> Envelope<Vec<SupportTicket>> {
    Envelope::ok(state.services.support.get_tickets(query.user_id).await)
}

pub async fn get_ticket(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Envelope<SupportTicket> {
    Envelope::ok(state.services.support.get_ticket(id).await)
}

pub async fn create_ticket(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateTicketInput>,
) -> Envelope<SupportTicket> {
    Envelope::created(state.services.support.create_ticket(input).await)
}

pub async fn update_ticket(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(patch): JsonBody<Map<String, Value>>,
) -> Envelope<SupportTicket> {
    Envelope::ok(state.services.support.update_ticket(id, patch).await)
}

pub async fn list_agents(State(state): State<AppState>) -> Envelope<Vec<SupportAgent>> {
    Envelope::ok(state.services.support.get_agents().await)
}
