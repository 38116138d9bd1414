//! Third-party integrations and their activity log.
//!
//! Every write appends an `integration_logs` entry through the audit
//! dispatcher. The entry is queued after the primary write and its outcome is
//! never reported back to the caller.

use chrono::Utc;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::models::{
    ApiResponse, CreateIntegrationInput, Integration, IntegrationAction, IntegrationLog,
    IntegrationTestResult, NewIntegrationLog, UpdateIntegrationInput, INTEGRATION_FIELDS,
};
use crate::services::audit::AuditDispatcher;
use crate::services::{patched_fields, storage_patch};
use crate::store::{IntegrationStore, StoreError, StoreResult};

const DISABLED_MESSAGE: &str = "Integration is disabled";

#[derive(Clone)]
pub struct IntegrationApi {
    store: Arc<dyn IntegrationStore>,
    audit: AuditDispatcher,
}

impl IntegrationApi {
    pub fn new(store: Arc<dyn IntegrationStore>, audit: AuditDispatcher) -> Self {
        Self { store, audit }
    }

    pub async fn get_integrations(&self, user_id: Uuid) -> ApiResponse<Vec<Integration>> {
        ApiResponse::from_list_result(
            self.store.list_integrations(user_id).await,
            "Failed to load integrations",
        )
    }

    pub async fn get_integration(&self, id: Uuid) -> ApiResponse<Integration> {
        ApiResponse::from_result(self.find(id).await, "Failed to load integration")
    }

    async fn find(&self, id: Uuid) -> StoreResult<Integration> {
        self.store
            .find_integration(id)
            .await?
            .ok_or_else(|| StoreError::not_found("Integration"))
    }

    pub async fn create_integration(&self, input: CreateIntegrationInput) -> ApiResponse<Integration> {
        ApiResponse::from_result(self.try_create(input).await, "Failed to create integration")
    }

    async fn try_create(&self, input: CreateIntegrationInput) -> StoreResult<Integration> {
        input.validate()?;
        let integration = self.store.create_integration(&input).await?;

        self.audit.record_integration(
            NewIntegrationLog::success(integration.id, IntegrationAction::Create)
                .with_message(format!("Integration {} created", integration.name))
                .with_details(json!({
                    "provider": integration.provider,
                    "integrationType": integration.integration_type,
                })),
        );
        Ok(integration)
    }

    pub async fn update_integration(&self, id: Uuid, patch: Map<String, Value>) -> ApiResponse<Integration> {
        ApiResponse::from_result(self.try_update(id, patch).await, "Failed to update integration")
    }

    async fn try_update(&self, id: Uuid, patch: Map<String, Value>) -> StoreResult<Integration> {
        let fields = patched_fields(&patch);
        let columns = storage_patch::<UpdateIntegrationInput>(&INTEGRATION_FIELDS, patch)?;
        let integration = self
            .store
            .update_integration(id, &columns)
            .await?
            .ok_or_else(|| StoreError::not_found("Integration"))?;

        self.audit.record_integration(
            NewIntegrationLog::success(id, IntegrationAction::Update)
                .with_details(json!({ "fields": fields })),
        );
        Ok(integration)
    }

    /// Delete an integration; `data` is the deleted id. Its log history is kept.
    pub async fn delete_integration(&self, id: Uuid) -> ApiResponse<Uuid> {
        ApiResponse::from_result(self.try_delete(id).await, "Failed to delete integration")
    }

    async fn try_delete(&self, id: Uuid) -> StoreResult<Uuid> {
        if !self.store.delete_integration(id).await? {
            return Err(StoreError::not_found("Integration"));
        }

        self.audit.record_integration(
            NewIntegrationLog::success(id, IntegrationAction::Delete)
                .with_message("Integration deleted"),
        );
        Ok(id)
    }

    /// Check that the integration is present and enabled. No remote call is made.
    pub async fn test_integration(&self, id: Uuid) -> ApiResponse<IntegrationTestResult> {
        ApiResponse::from_result(self.try_test(id).await, "Failed to test integration")
    }

    async fn try_test(&self, id: Uuid) -> StoreResult<IntegrationTestResult> {
        let integration = self.find(id).await?;
        if !integration.enabled {
            self.audit.record_integration(NewIntegrationLog::error(
                id,
                IntegrationAction::Test,
                DISABLED_MESSAGE,
            ));
            return Err(StoreError::Invalid(DISABLED_MESSAGE.to_string()));
        }

        let message = format!("{} integration is configured and enabled", integration.provider);
        self.audit.record_integration(
            NewIntegrationLog::success(id, IntegrationAction::Test).with_message(message.clone()),
        );
        Ok(IntegrationTestResult {
            integration_id: id,
            message,
            tested_at: Utc::now(),
        })
    }

    /// Mark an enabled integration as synced now.
    pub async fn sync_integration(&self, id: Uuid) -> ApiResponse<Integration> {
        ApiResponse::from_result(self.try_sync(id).await, "Failed to sync integration")
    }

    async fn try_sync(&self, id: Uuid) -> StoreResult<Integration> {
        let integration = self.find(id).await?;
        if !integration.enabled {
            self.audit.record_integration(NewIntegrationLog::error(
                id,
                IntegrationAction::Sync,
                DISABLED_MESSAGE,
            ));
            return Err(StoreError::Invalid(DISABLED_MESSAGE.to_string()));
        }

        let synced = self
            .store
            .mark_synced(id, Utc::now())
            .await?
            .ok_or_else(|| StoreError::not_found("Integration"))?;

        self.audit.record_integration(
            NewIntegrationLog::success(id, IntegrationAction::Sync)
                .with_details(json!({ "lastSync": synced.last_sync })),
        );
        Ok(synced)
    }

    pub async fn get_integration_logs(&self, integration_id: Uuid) -> ApiResponse<Vec<IntegrationLog>> {
        ApiResponse::from_list_result(
            self.store.list_integration_logs(integration_id).await,
            "Failed to load integration logs",
        )
    }
}
