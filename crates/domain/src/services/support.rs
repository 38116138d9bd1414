//! Support tickets and agents.

use chrono::Utc;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::models::{
    ApiResponse, CreateTicketInput, SupportAgent, SupportTicket, TicketStatus, UpdateTicketInput,
    SUPPORT_TICKET_FIELDS,
};
use crate::services::storage_patch;
use crate::store::{StoreError, StoreResult, SupportStore};

#[derive(Clone)]
pub struct SupportApi {
    store: Arc<dyn SupportStore>,
}

impl SupportApi {
    pub fn new(store: Arc<dyn SupportStore>) -> Self {
        Self { store }
    }

    pub async fn get_tickets(&self, user_id: Uuid) -> ApiResponse<Vec<SupportTicket>> {
        ApiResponse::from_list_result(
            self.store.list_tickets(user_id).await,
            "Failed to load tickets",
        )
    }

    pub async fn get_ticket(&self, id: Uuid) -> ApiResponse<SupportTicket> {
        let result = self
            .store
            .find_ticket(id)
            .await
            .and_then(|ticket| ticket.ok_or_else(|| StoreError::not_found("Support ticket")));
        ApiResponse::from_result(result, "Failed to load ticket")
    }

    /// Open a ticket and hand it to the least-loaded online agent.
    pub async fn create_ticket(&self, input: CreateTicketInput) -> ApiResponse<SupportTicket> {
        ApiResponse::from_result(self.try_create_ticket(input).await, "Failed to create ticket")
    }

    async fn try_create_ticket(&self, input: CreateTicketInput) -> StoreResult<SupportTicket> {
        input.validate()?;
        let assignment = self.store.create_ticket(&input).await?;

        match &assignment.agent {
            Some(agent) => tracing::info!(
                ticket_id = %assignment.ticket.id,
                agent_id = %agent.id,
                active_tickets = agent.active_tickets,
                "Ticket assigned"
            ),
            None => tracing::info!(
                ticket_id = %assignment.ticket.id,
                "No online agent; ticket left unassigned"
            ),
        }

        Ok(assignment.ticket)
    }

    pub async fn update_ticket(&self, id: Uuid, patch: Map<String, Value>) -> ApiResponse<SupportTicket> {
        ApiResponse::from_result(self.try_update_ticket(id, patch).await, "Failed to update ticket")
    }

    async fn try_update_ticket(&self, id: Uuid, patch: Map<String, Value>) -> StoreResult<SupportTicket> {
        let mut columns = storage_patch::<UpdateTicketInput>(&SUPPORT_TICKET_FIELDS, patch)?;

        let status = columns
            .get("status")
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<TicketStatus>().ok());
        match status {
            Some(TicketStatus::Resolved) => {
                columns.insert("resolved_at".into(), json!(Utc::now()));
            }
            Some(TicketStatus::Open | TicketStatus::InProgress | TicketStatus::Waiting) => {
                columns.insert("resolved_at".into(), Value::Null);
            }
            Some(TicketStatus::Closed) | None => {}
        }

        self.store
            .update_ticket(id, &columns)
            .await?
            .ok_or_else(|| StoreError::not_found("Support ticket"))
    }

    pub async fn get_agents(&self) -> ApiResponse<Vec<SupportAgent>> {
        ApiResponse::from_list_result(self.store.list_agents().await, "Failed to load agents")
    }
}
