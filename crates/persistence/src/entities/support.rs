//! Support ticket and agent entities.

use chrono::{DateTime, Utc};
use domain::models::{SupportAgent, SupportTicket, SUPPORT_TICKET_FIELDS};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{map_row, parse_column};
use crate::error::DecodeError;

/// Database row mapping for the support_tickets table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct SupportTicketEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub agent_id: Option<Uuid>,
    pub subject: String,
    pub description: String,
    pub status: String,
    pub priority: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl TryFrom<SupportTicketEntity> for SupportTicket {
    type Error = DecodeError;

    fn try_from(entity: SupportTicketEntity) -> Result<Self, Self::Error> {
        map_row(&SUPPORT_TICKET_FIELDS, &entity)
    }
}

/// Database row mapping for the support_agents table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct SupportAgentEntity {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub status: String,
    pub active_tickets: i32,
    pub rating: f64,
    pub specialties: Vec<String>,
}

impl TryFrom<SupportAgentEntity> for SupportAgent {
    type Error = DecodeError;

    fn try_from(entity: SupportAgentEntity) -> Result<Self, Self::Error> {
        Ok(Self {
            id: entity.id,
            name: entity.name,
            email: entity.email,
            status: parse_column(&entity.status)?,
            active_tickets: entity.active_tickets,
            rating: entity.rating,
            specialties: entity.specialties,
        })
    }
}

impl From<&SupportAgent> for SupportAgentEntity {
    fn from(agent: &SupportAgent) -> Self {
        Self {
            id: agent.id,
            name: agent.name.clone(),
            email: agent.email.clone(),
            status: agent.status.as_str().to_string(),
            active_tickets: agent.active_tickets,
            rating: agent.rating,
            specialties: agent.specialties.clone(),
        }
    }
}
