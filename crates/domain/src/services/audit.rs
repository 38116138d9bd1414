//! Best-effort audit logging.
//!
//! Secondary log writes (integration logs, compliance audit entries) are queued
//! on an unbounded channel and written by a single background worker, so the
//! primary operation never waits on them. Writes that fail are kept in a
//! bounded dead-letter buffer and counted in `audit_dead_letters_total`.

use chrono::{DateTime, Utc};
use metrics::counter;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};
use validator::Validate;

use crate::models::{
    ApiResponse, AuditLog, AuditLogPage, CreateAuditLogInput, ListAuditLogsQuery,
    NewIntegrationLog,
};
use crate::store::{AuditStore, IntegrationStore, StoreResult};

/// Default number of dead letters retained.
pub const DEFAULT_DEAD_LETTER_CAPACITY: usize = 1000;

/// A log record queued for writing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuditRecord {
    IntegrationLog(NewIntegrationLog),
    AuditLog(CreateAuditLogInput),
}

impl AuditRecord {
    fn kind(&self) -> &'static str {
        match self {
            AuditRecord::IntegrationLog(_) => "integration_log",
            AuditRecord::AuditLog(_) => "audit_log",
        }
    }
}

/// A record whose write failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeadLetter {
    pub record: AuditRecord,
    pub error: String,
    pub failed_at: DateTime<Utc>,
}

/// Bounded buffer of dead letters. The oldest entry is evicted when full.
#[derive(Debug, Clone)]
pub struct DeadLetterQueue {
    entries: Arc<Mutex<VecDeque<DeadLetter>>>,
    capacity: usize,
}

impl DeadLetterQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::new())),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&self, record: AuditRecord, error: impl Into<String>) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(DeadLetter {
            record,
            error: error.into(),
            failed_at: Utc::now(),
        });
    }

    /// Copy of the retained dead letters, oldest first.
    pub fn snapshot(&self) -> Vec<DeadLetter> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

enum AuditCommand {
    Record(AuditRecord),
    Flush(oneshot::Sender<()>),
}

/// Handle to the background audit writer. Cheap to clone.
#[derive(Clone)]
pub struct AuditDispatcher {
    tx: mpsc::UnboundedSender<AuditCommand>,
    dead_letters: DeadLetterQueue,
}

impl AuditDispatcher {
    /// Start the background worker. Must be called inside a Tokio runtime.
    pub fn spawn(
        audit_store: Arc<dyn AuditStore>,
        integration_store: Arc<dyn IntegrationStore>,
        dead_letter_capacity: usize,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let dead_letters = DeadLetterQueue::new(dead_letter_capacity);
        tokio::spawn(run_worker(
            rx,
            audit_store,
            integration_store,
            dead_letters.clone(),
        ));
        Self { tx, dead_letters }
    }

    /// Queue a record. Never blocks and never fails the caller.
    pub fn record(&self, record: AuditRecord) {
        if let Err(mpsc::error::SendError(command)) = self.tx.send(AuditCommand::Record(record)) {
            if let AuditCommand::Record(record) = command {
                tracing::warn!(kind = record.kind(), "Audit worker stopped; dead-lettering record");
                counter!("audit_dead_letters_total", "kind" => record.kind()).increment(1);
                self.dead_letters.push(record, "audit worker stopped");
            }
        }
    }

    pub fn record_integration(&self, log: NewIntegrationLog) {
        self.record(AuditRecord::IntegrationLog(log));
    }

    pub fn record_audit(&self, input: CreateAuditLogInput) {
        self.record(AuditRecord::AuditLog(input));
    }

    /// Wait until every record queued before this call has been handled.
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(AuditCommand::Flush(done_tx)).is_ok() {
            let _ = done_rx.await;
        }
    }

    pub fn dead_letters(&self) -> Vec<DeadLetter> {
        self.dead_letters.snapshot()
    }
}

async fn run_worker(
    mut rx: mpsc::UnboundedReceiver<AuditCommand>,
    audit_store: Arc<dyn AuditStore>,
    integration_store: Arc<dyn IntegrationStore>,
    dead_letters: DeadLetterQueue,
) {
    while let Some(command) = rx.recv().await {
        match command {
            AuditCommand::Record(record) => {
                let result = match &record {
                    AuditRecord::IntegrationLog(log) => integration_store
                        .insert_integration_log(log)
                        .await
                        .map(|_| ()),
                    AuditRecord::AuditLog(input) => {
                        audit_store.insert_audit_log(input).await.map(|_| ())
                    }
                };

                if let Err(e) = result {
                    tracing::warn!(kind = record.kind(), error = %e, "Failed to write audit record");
                    counter!("audit_dead_letters_total", "kind" => record.kind()).increment(1);
                    dead_letters.push(record, e.to_string());
                }
            }
            AuditCommand::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    tracing::debug!("Audit worker stopped");
}

/// Data access for audit logs.
#[derive(Clone)]
pub struct AuditApi {
    store: Arc<dyn AuditStore>,
    dispatcher: AuditDispatcher,
}

impl AuditApi {
    pub fn new(store: Arc<dyn AuditStore>, dispatcher: AuditDispatcher) -> Self {
        Self { store, dispatcher }
    }

    /// Entries matching the query, newest first (one page).
    pub async fn get_audit_logs(&self, query: &ListAuditLogsQuery) -> ApiResponse<Vec<AuditLog>> {
        let result = self
            .store
            .list_audit_logs(query, query.page_request())
            .await
            .map(|(logs, _)| logs);
        ApiResponse::from_list_result(result, "Failed to load audit logs")
    }

    /// Like [`get_audit_logs`](Self::get_audit_logs) with pagination metadata.
    pub async fn get_audit_log_page(&self, query: &ListAuditLogsQuery) -> ApiResponse<AuditLogPage> {
        let page = query.page_request();
        let result = self
            .store
            .list_audit_logs(query, page)
            .await
            .map(|(logs, total)| AuditLogPage {
                logs,
                pagination: page.summary(total),
            });
        ApiResponse::from_result(result, "Failed to load audit logs")
    }

    pub async fn create_audit_log(&self, input: CreateAuditLogInput) -> ApiResponse<AuditLog> {
        ApiResponse::from_result(self.try_create(input).await, "Failed to create audit log")
    }

    async fn try_create(&self, input: CreateAuditLogInput) -> StoreResult<AuditLog> {
        input.validate()?;
        self.store.insert_audit_log(&input).await
    }

    /// Records whose background write failed, oldest first.
    pub fn dead_letters(&self) -> ApiResponse<Vec<DeadLetter>> {
        ApiResponse::ok(self.dispatcher.dead_letters())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IntegrationAction;
    use serde_json::json;
    use uuid::Uuid;

    #[test]
    fn test_dead_letter_queue_evicts_oldest() {
        let queue = DeadLetterQueue::new(2);
        for action in ["a", "b", "c"] {
            queue.push(
                AuditRecord::AuditLog(CreateAuditLogInput::new(action, "integration")),
                "boom",
            );
        }
        let letters = queue.snapshot();
        assert_eq!(letters.len(), 2);
        match &letters[0].record {
            AuditRecord::AuditLog(input) => assert_eq!(input.action, "b"),
            other => panic!("unexpected record {:?}", other),
        }
    }

    #[test]
    fn test_dead_letter_queue_minimum_capacity() {
        let queue = DeadLetterQueue::new(0);
        queue.push(
            AuditRecord::AuditLog(CreateAuditLogInput::new("x", "y")),
            "err",
        );
        assert_eq!(queue.len(), 1);
        assert!(!queue.is_empty());
    }

    #[test]
    fn test_audit_record_serializes_with_kind_tag() {
        let record = AuditRecord::IntegrationLog(NewIntegrationLog::success(
            Uuid::nil(),
            IntegrationAction::Sync,
        ));
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["kind"], json!("integration_log"));
        assert_eq!(value["action"], json!("sync"));
    }
}
