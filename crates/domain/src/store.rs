//! Datastore ports.
//!
//! Each data-access service talks to the managed datastore through one of
//! these traits. `persistence` implements them for PostgreSQL and for an
//! in-process store. Patches passed to `update_*` are already translated to
//! snake_case storage columns and contain only writable fields.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use shared::field_map::FieldMapError;
use shared::pagination::PageRequest;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    AccountManager, AccountManagerMeeting, AccountManagerMessage, AssignedManager, AuditLog,
    ComplianceFramework, ComplianceRequirement, CreateAuditLogInput, CreateFrameworkInput,
    CreateIntegrationInput, CreateMeetingInput, CreateMessageInput, CreateRequirementInput,
    CreateTicketInput, IncidentReport, IncidentStatus, Integration, IntegrationLog,
    ListAuditLogsQuery, MeetingStatus, NewIntegrationLog, SlaMetric, SupportAgent, SupportTicket,
    SystemMetricsQuery, SystemMetric, TicketAssignment,
};

/// A storage column patch: snake_case column name to JSON value.
pub type ColumnPatch = Map<String, Value>;

/// Errors raised by datastore implementations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Invalid(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Datastore unavailable: {0}")]
    Unavailable(String),

    #[error("{0}")]
    Database(String),
}

impl StoreError {
    /// `"<resource> not found"`.
    pub fn not_found(resource: &str) -> Self {
        StoreError::NotFound(format!("{} not found", resource))
    }
}

impl From<FieldMapError> for StoreError {
    fn from(err: FieldMapError) -> Self {
        StoreError::Invalid(err.to_string())
    }
}

impl From<validator::ValidationErrors> for StoreError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| match &e.message {
                    Some(message) => message.to_string(),
                    None => format!("Invalid value for {}", field),
                })
            })
            .collect();
        messages.sort();

        match messages.len() {
            0 => StoreError::Invalid("Validation failed".to_string()),
            1 => StoreError::Invalid(messages.remove(0)),
            _ => StoreError::Invalid(messages.join("; ")),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Invalid(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait SupportStore: Send + Sync {
    /// Tickets raised by a user, newest first.
    async fn list_tickets(&self, user_id: Uuid) -> StoreResult<Vec<SupportTicket>>;

    async fn find_ticket(&self, id: Uuid) -> StoreResult<Option<SupportTicket>>;

    /// Create a ticket and assign it to the online agent with the fewest
    /// active tickets, incrementing that agent's count, as one atomic step.
    async fn create_ticket(&self, input: &CreateTicketInput) -> StoreResult<TicketAssignment>;

    async fn update_ticket(&self, id: Uuid, patch: &ColumnPatch) -> StoreResult<Option<SupportTicket>>;

    /// All agents ordered by name.
    async fn list_agents(&self) -> StoreResult<Vec<SupportAgent>>;
}

#[async_trait]
pub trait AccountManagerStore: Send + Sync {
    async fn list_managers(&self) -> StoreResult<Vec<AccountManager>>;

    async fn find_assignment(&self, user_id: Uuid) -> StoreResult<Option<AssignedManager>>;

    /// Return the user's existing assignment, or atomically pick the active
    /// manager with the lowest client count, increment it and record the
    /// assignment.
    async fn assign_least_loaded(&self, user_id: Uuid) -> StoreResult<AssignedManager>;

    async fn create_meeting(&self, input: &CreateMeetingInput) -> StoreResult<AccountManagerMeeting>;

    /// Meetings for a user ordered by scheduled time.
    async fn list_meetings(&self, user_id: Uuid) -> StoreResult<Vec<AccountManagerMeeting>>;

    async fn update_meeting_status(
        &self,
        id: Uuid,
        status: MeetingStatus,
    ) -> StoreResult<Option<AccountManagerMeeting>>;

    async fn create_message(&self, input: &CreateMessageInput) -> StoreResult<AccountManagerMessage>;

    /// Messages for a user, oldest first.
    async fn list_messages(&self, user_id: Uuid) -> StoreResult<Vec<AccountManagerMessage>>;

    /// Mark all manager-sent messages to a user as read. Returns the number changed.
    async fn mark_messages_read(&self, user_id: Uuid) -> StoreResult<u64>;
}

#[async_trait]
pub trait IntegrationStore: Send + Sync {
    /// Integrations for a user ordered by creation time then id.
    async fn list_integrations(&self, user_id: Uuid) -> StoreResult<Vec<Integration>>;

    async fn find_integration(&self, id: Uuid) -> StoreResult<Option<Integration>>;

    async fn create_integration(&self, input: &CreateIntegrationInput) -> StoreResult<Integration>;

    async fn update_integration(&self, id: Uuid, patch: &ColumnPatch) -> StoreResult<Option<Integration>>;

    /// Mark an integration synced at `at`, setting status to active.
    async fn mark_synced(&self, id: Uuid, at: DateTime<Utc>) -> StoreResult<Option<Integration>>;

    /// Returns false when no row matched.
    async fn delete_integration(&self, id: Uuid) -> StoreResult<bool>;

    async fn insert_integration_log(&self, log: &NewIntegrationLog) -> StoreResult<IntegrationLog>;

    /// Log entries for an integration, newest first.
    async fn list_integration_logs(&self, integration_id: Uuid) -> StoreResult<Vec<IntegrationLog>>;
}

#[async_trait]
pub trait ComplianceStore: Send + Sync {
    async fn list_frameworks(&self) -> StoreResult<Vec<ComplianceFramework>>;

    async fn find_framework(&self, id: Uuid) -> StoreResult<Option<ComplianceFramework>>;

    async fn create_framework(&self, input: &CreateFrameworkInput) -> StoreResult<ComplianceFramework>;

    async fn update_framework(
        &self,
        id: Uuid,
        patch: &ColumnPatch,
    ) -> StoreResult<Option<ComplianceFramework>>;

    /// Delete a framework and its requirements. Returns false when no row matched.
    async fn delete_framework(&self, id: Uuid) -> StoreResult<bool>;

    async fn list_requirements(&self, framework_id: Uuid) -> StoreResult<Vec<ComplianceRequirement>>;

    /// Create a requirement and increment its framework's requirement count atomically.
    async fn create_requirement(
        &self,
        input: &CreateRequirementInput,
    ) -> StoreResult<ComplianceRequirement>;

    async fn update_requirement(
        &self,
        id: Uuid,
        patch: &ColumnPatch,
    ) -> StoreResult<Option<ComplianceRequirement>>;
}

#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn insert_audit_log(&self, input: &CreateAuditLogInput) -> StoreResult<AuditLog>;

    /// Filtered page of entries, newest first, with the total match count.
    async fn list_audit_logs(
        &self,
        query: &ListAuditLogsQuery,
        page: PageRequest,
    ) -> StoreResult<(Vec<AuditLog>, i64)>;
}

#[async_trait]
pub trait MetricsStore: Send + Sync {
    /// Samples newest first.
    async fn list_system_metrics(&self, query: &SystemMetricsQuery) -> StoreResult<Vec<SystemMetric>>;

    async fn list_sla_metrics(&self, period: Option<&str>) -> StoreResult<Vec<SlaMetric>>;

    /// Incidents newest first.
    async fn list_incident_reports(
        &self,
        status: Option<IncidentStatus>,
    ) -> StoreResult<Vec<IncidentReport>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Probe {
        #[validate(length(min = 3, message = "Name too short"))]
        name: String,
    }

    #[test]
    fn test_not_found_message() {
        assert_eq!(
            StoreError::not_found("Support ticket").to_string(),
            "Support ticket not found"
        );
    }

    #[test]
    fn test_from_validation_errors() {
        let errors = Probe { name: "x".into() }.validate().unwrap_err();
        assert_eq!(
            StoreError::from(errors),
            StoreError::Invalid("Name too short".to_string())
        );
    }

    #[test]
    fn test_from_field_map_error() {
        let err = FieldMapError::EmptyPatch { resource: "integration" };
        assert!(matches!(StoreError::from(err), StoreError::Invalid(_)));
    }

    #[test]
    fn test_unavailable_display() {
        assert_eq!(
            StoreError::Unavailable("pool timed out".into()).to_string(),
            "Datastore unavailable: pool timed out"
        );
    }
}
