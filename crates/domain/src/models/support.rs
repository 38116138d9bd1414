//! Support ticket and support agent models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::field_map::{FieldMap, FieldSpec};
use uuid::Uuid;
use validator::Validate;

string_enum! {
    /// Lifecycle of a support ticket.
    TicketStatus {
        Open => "open",
        InProgress => "in-progress",
        Waiting => "waiting",
        Resolved => "resolved",
        Closed => "closed",
    }
}

string_enum! {
    TicketPriority {
        Low => "low",
        Medium => "medium",
        High => "high",
        Urgent => "urgent",
    }
}

string_enum! {
    TicketCategory {
        Technical => "technical",
        Billing => "billing",
        Tax => "tax",
        Account => "account",
        General => "general",
    }
}

string_enum! {
    /// Availability of a support agent. Only `online` agents receive new tickets.
    AgentStatus {
        Online => "online",
        Busy => "busy",
        Offline => "offline",
    }
}

impl Default for TicketPriority {
    fn default() -> Self {
        TicketPriority::Medium
    }
}

impl Default for TicketCategory {
    fn default() -> Self {
        TicketCategory::General
    }
}

/// A support ticket raised by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportTicket {
    pub id: Uuid,
    pub user_id: Uuid,
    pub agent_id: Option<Uuid>,
    pub subject: String,
    pub description: String,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub category: TicketCategory,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

/// A support agent who can be assigned tickets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportAgent {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub status: AgentStatus,
    pub active_tickets: i32,
    pub rating: f64,
    pub specialties: Vec<String>,
}

/// Result of creating a ticket: the ticket and the agent it was given to, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct TicketAssignment {
    pub ticket: SupportTicket,
    pub agent: Option<SupportAgent>,
}

/// Request payload for opening a ticket.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketInput {
    pub user_id: Uuid,

    #[validate(length(min = 1, max = 200, message = "Subject must be 1-200 characters"))]
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub subject: String,

    #[validate(length(min = 1, max = 5000, message = "Description must be 1-5000 characters"))]
    pub description: String,

    #[serde(default)]
    pub priority: TicketPriority,

    #[serde(default)]
    pub category: TicketCategory,
}

/// Partial update of a ticket. Absent fields are left unchanged; nullable
/// fields use a nested `Option` so an explicit `null` clears them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateTicketInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 200, message = "Subject must be 1-200 characters"))]
    pub subject: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 5000, message = "Description must be 1-5000 characters"))]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TicketStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TicketPriority>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<TicketCategory>,

    /// `Some(None)` unassigns the ticket.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "::serde_with::rust::double_option")]
    pub agent_id: Option<Option<Uuid>>,
}

pub const SUPPORT_TICKET_FIELDS: FieldMap = FieldMap::new(
    "support ticket",
    &[
        FieldSpec::read_only("id", "id"),
        FieldSpec::read_only("userId", "user_id"),
        FieldSpec::writable("agentId", "agent_id"),
        FieldSpec::writable("subject", "subject"),
        FieldSpec::writable("description", "description"),
        FieldSpec::writable("status", "status"),
        FieldSpec::writable("priority", "priority"),
        FieldSpec::writable("category", "category"),
        FieldSpec::read_only("createdAt", "created_at"),
        FieldSpec::read_only("updatedAt", "updated_at"),
        FieldSpec::read_only("resolvedAt", "resolved_at"),
    ],
);
