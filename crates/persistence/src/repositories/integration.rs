//! Integration and integration log repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::models::{CreateIntegrationInput, Integration, IntegrationLog, NewIntegrationLog};
use domain::store::{ColumnPatch, IntegrationStore, StoreResult};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use uuid::Uuid;

use super::set_from_record;
use crate::entities::{IntegrationEntity, IntegrationLogEntity};
use crate::error::PersistenceResult;
use crate::metrics::QueryTimer;

#[derive(Clone)]
pub struct IntegrationRepository {
    pool: PgPool,
}

impl IntegrationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_by_user(&self, user_id: Uuid) -> PersistenceResult<Vec<IntegrationEntity>> {
        let timer = QueryTimer::new("list_integrations");
        let rows = sqlx::query_as::<_, IntegrationEntity>(
            r#"
            SELECT id, user_id, name, provider, integration_type, config, credentials, status,
                   enabled, last_sync, created_at, updated_at
            FROM integrations
            WHERE user_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        timer.record();
        Ok(rows)
    }

    pub async fn find_by_id(&self, id: Uuid) -> PersistenceResult<Option<IntegrationEntity>> {
        let timer = QueryTimer::new("find_integration");
        let row = sqlx::query_as::<_, IntegrationEntity>(
            r#"
            SELECT id, user_id, name, provider, integration_type, config, credentials, status,
                   enabled, last_sync, created_at, updated_at
            FROM integrations
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        timer.record();
        Ok(row)
    }

    pub async fn insert(&self, input: &CreateIntegrationInput) -> PersistenceResult<IntegrationEntity> {
        let timer = QueryTimer::new("create_integration");
        let row = sqlx::query_as::<_, IntegrationEntity>(
            r#"
            INSERT INTO integrations
                (user_id, name, provider, integration_type, config, credentials, status, enabled)
            VALUES ($1, $2, $3, $4, $5, $6, 'inactive', $7)
            RETURNING id, user_id, name, provider, integration_type, config, credentials, status,
                      enabled, last_sync, created_at, updated_at
            "#,
        )
        .bind(input.user_id)
        .bind(&input.name)
        .bind(&input.provider)
        .bind(input.integration_type.as_str())
        .bind(&input.config)
        .bind(&input.credentials)
        .bind(input.enabled)
        .fetch_one(&self.pool)
        .await?;
        timer.record();
        Ok(row)
    }

    pub async fn update(
        &self,
        id: Uuid,
        patch: &ColumnPatch,
    ) -> PersistenceResult<Option<IntegrationEntity>> {
        let timer = QueryTimer::new("update_integration");
        let sql = format!(
            r#"
            UPDATE integrations AS t
            SET {}, updated_at = NOW()
            FROM jsonb_populate_record(NULL::integrations, $2) AS p
            WHERE t.id = $1
            RETURNING t.id, t.user_id, t.name, t.provider, t.integration_type, t.config,
                      t.credentials, t.status, t.enabled, t.last_sync, t.created_at, t.updated_at
            "#,
            set_from_record(patch)?
        );
        let row = sqlx::query_as::<_, IntegrationEntity>(&sql)
            .bind(id)
            .bind(JsonValue::Object(patch.clone()))
            .fetch_optional(&self.pool)
            .await?;
        timer.record();
        Ok(row)
    }

    pub async fn set_synced(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> PersistenceResult<Option<IntegrationEntity>> {
        let timer = QueryTimer::new("sync_integration");
        let row = sqlx::query_as::<_, IntegrationEntity>(
            r#"
            UPDATE integrations
            SET status = 'active', last_sync = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, user_id, name, provider, integration_type, config, credentials, status,
                      enabled, last_sync, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(at)
        .fetch_optional(&self.pool)
        .await?;
        timer.record();
        Ok(row)
    }

    pub async fn delete(&self, id: Uuid) -> PersistenceResult<bool> {
        let timer = QueryTimer::new("delete_integration");
        let result = sqlx::query("DELETE FROM integrations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(result.rows_affected() > 0)
    }

    pub async fn insert_log(&self, log: &NewIntegrationLog) -> PersistenceResult<IntegrationLogEntity> {
        let timer = QueryTimer::new("create_integration_log");
        let row = sqlx::query_as::<_, IntegrationLogEntity>(
            r#"
            INSERT INTO integration_logs (integration_id, action, status, message, details)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, integration_id, action, status, message, details, created_at
            "#,
        )
        .bind(log.integration_id)
        .bind(log.action.as_str())
        .bind(log.status.as_str())
        .bind(&log.message)
        .bind(&log.details)
        .fetch_one(&self.pool)
        .await?;
        timer.record();
        Ok(row)
    }

    pub async fn logs_for(&self, integration_id: Uuid) -> PersistenceResult<Vec<IntegrationLogEntity>> {
        let timer = QueryTimer::new("list_integration_logs");
        let rows = sqlx::query_as::<_, IntegrationLogEntity>(
            r#"
            SELECT id, integration_id, action, status, message, details, created_at
            FROM integration_logs
            WHERE integration_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(integration_id)
        .fetch_all(&self.pool)
        .await?;
        timer.record();
        Ok(rows)
    }
}

#[async_trait]
impl IntegrationStore for IntegrationRepository {
    async fn list_integrations(&self, user_id: Uuid) -> StoreResult<Vec<Integration>> {
        let rows = self.list_by_user(user_id).await?;
        Ok(rows
            .into_iter()
            .map(Integration::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn find_integration(&self, id: Uuid) -> StoreResult<Option<Integration>> {
        Ok(self.find_by_id(id).await?.map(Integration::try_from).transpose()?)
    }

    async fn create_integration(&self, input: &CreateIntegrationInput) -> StoreResult<Integration> {
        Ok(self.insert(input).await?.try_into()?)
    }

    async fn update_integration(&self, id: Uuid, patch: &ColumnPatch) -> StoreResult<Option<Integration>> {
        Ok(self.update(id, patch).await?.map(Integration::try_from).transpose()?)
    }

    async fn mark_synced(&self, id: Uuid, at: DateTime<Utc>) -> StoreResult<Option<Integration>> {
        Ok(self.set_synced(id, at).await?.map(Integration::try_from).transpose()?)
    }

    async fn delete_integration(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.delete(id).await?)
    }

    async fn insert_integration_log(&self, log: &NewIntegrationLog) -> StoreResult<IntegrationLog> {
        Ok(self.insert_log(log).await?.try_into()?)
    }

    async fn list_integration_logs(&self, integration_id: Uuid) -> StoreResult<Vec<IntegrationLog>> {
        let rows = self.logs_for(integration_id).await?;
        Ok(rows
            .into_iter()
            .map(IntegrationLog::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }
}
