//! Behaviour when the datastore fails: envelopes and audit dead letters.

mod common;

use async_trait::async_trait;
use common::{integration_input, ticket_input};
use domain::models::{
    AuditLog, CreateAuditLogInput, CreateTicketInput, FailureKind, ListAuditLogsQuery,
    SupportAgent, SupportTicket, TicketAssignment,
};
use domain::services::{AuditApi, AuditDispatcher, AuditRecord, IntegrationApi, SupportApi};
use domain::store::{AuditStore, ColumnPatch, StoreError, StoreResult, SupportStore};
use persistence::MemoryStore;
use shared::pagination::PageRequest;
use std::sync::Arc;
use uuid::Uuid;

/// Every call fails with the configured error.
struct DownStore(StoreError);

#[async_trait]
impl SupportStore for DownStore {
    async fn list_tickets(&self, _user_id: Uuid) -> StoreResult<Vec<SupportTicket>> {
        Err(self.0.clone())
    }

    async fn find_ticket(&self, _id: Uuid) -> StoreResult<Option<SupportTicket>> {
        Err(self.0.clone())
    }

    async fn create_ticket(&self, _input: &CreateTicketInput) -> StoreResult<TicketAssignment> {
        Err(self.0.clone())
    }

    async fn update_ticket(&self, _id: Uuid, _patch: &ColumnPatch) -> StoreResult<Option<SupportTicket>> {
        Err(self.0.clone())
    }

    async fn list_agents(&self) -> StoreResult<Vec<SupportAgent>> {
        Err(self.0.clone())
    }
}

#[async_trait]
impl AuditStore for DownStore {
    async fn insert_audit_log(&self, _input: &CreateAuditLogInput) -> StoreResult<AuditLog> {
        Err(self.0.clone())
    }

    async fn list_audit_logs(
        &self,
        _query: &ListAuditLogsQuery,
        _page: PageRequest,
    ) -> StoreResult<(Vec<AuditLog>, i64)> {
        Err(self.0.clone())
    }
}

fn unavailable() -> Arc<DownStore> {
    Arc::new(DownStore(StoreError::Unavailable("pool timed out".to_string())))
}

#[tokio::test]
async fn test_list_failure_has_empty_data() {
    let api = SupportApi::new(unavailable());
    let resp = api.get_tickets(Uuid::new_v4()).await;

    assert!(!resp.success);
    assert_eq!(resp.data, Some(Vec::new()));
    assert_eq!(resp.failure, Some(FailureKind::Unavailable));

    let body = serde_json::to_value(&resp).unwrap();
    assert_eq!(body["data"], serde_json::json!([]));
    assert!(body["error"].as_str().unwrap().contains("pool timed out"));
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_single_failure_has_null_data() {
    let api = SupportApi::new(Arc::new(DownStore(StoreError::Database(
        "connection reset".to_string(),
    ))));
    let resp = api.create_ticket(ticket_input(Uuid::new_v4())).await;

    assert!(!resp.success);
    assert!(resp.data.is_none());
    assert_eq!(resp.failure, Some(FailureKind::Internal));
    assert_eq!(resp.error.as_deref(), Some("connection reset"));
}

#[tokio::test]
async fn test_failed_audit_write_is_dead_lettered() {
    let memory = MemoryStore::new();
    let dispatcher = AuditDispatcher::spawn(unavailable(), Arc::new(memory.clone()), 10);
    let audit = AuditApi::new(unavailable(), dispatcher.clone());

    dispatcher.record_audit(CreateAuditLogInput::new("delete", "compliance_framework"));
    dispatcher.flush().await;

    let dead = audit.dead_letters().data.unwrap();
    assert_eq!(dead.len(), 1);
    assert!(matches!(dead[0].record, AuditRecord::AuditLog(ref input) if input.action == "delete"));
    assert!(dead[0].error.contains("pool timed out"));
}

#[tokio::test]
async fn test_audit_failure_does_not_fail_primary_operation() {
    let memory = MemoryStore::new();
    let dispatcher = AuditDispatcher::spawn(unavailable(), Arc::new(memory.clone()), 10);
    let integrations = IntegrationApi::new(Arc::new(memory.clone()), dispatcher.clone());

    let created = integrations
        .create_integration(integration_input(Uuid::new_v4()))
        .await;
    assert!(created.success);

    dispatcher.flush().await;
    assert!(dispatcher.dead_letters().is_empty());
}

#[tokio::test]
async fn test_dead_letters_are_bounded() {
    let memory = MemoryStore::new();
    let dispatcher = AuditDispatcher::spawn(unavailable(), Arc::new(memory), 2);

    for action in ["one", "two", "three"] {
        dispatcher.record_audit(CreateAuditLogInput::new(action, "integration"));
    }
    dispatcher.flush().await;

    let actions: Vec<String> = dispatcher
        .dead_letters()
        .into_iter()
        .filter_map(|d| match d.record {
            AuditRecord::AuditLog(input) => Some(input.action),
            AuditRecord::IntegrationLog(_) => None,
        })
        .collect();
    assert_eq!(actions, vec!["two", "three"]);
}
