//! Compliance framework and requirement repository.

use async_trait::async_trait;
use domain::models::{
    ComplianceFramework, ComplianceRequirement, CreateFrameworkInput, CreateRequirementInput,
};
use domain::store::{ColumnPatch, ComplianceStore, StoreError, StoreResult};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use uuid::Uuid;

use super::set_from_record;
use crate::entities::{ComplianceFrameworkEntity, ComplianceRequirementEntity};
use crate::error::PersistenceResult;
use crate::metrics::QueryTimer;

#[derive(Clone)]
pub struct ComplianceRepository {
    pool: PgPool,
}

impl ComplianceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_all_frameworks(&self) -> PersistenceResult<Vec<ComplianceFrameworkEntity>> {
        let timer = QueryTimer::new("list_compliance_frameworks");
        let rows = sqlx::query_as::<_, ComplianceFrameworkEntity>(
            r#"
            SELECT id, name, description, version, status, requirements_count, compliance_score,
                   last_assessment, created_at, updated_at
            FROM compliance_frameworks
            ORDER BY name ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        timer.record();
        Ok(rows)
    }

    pub async fn find_framework_by_id(&self, id: Uuid) -> PersistenceResult<Option<ComplianceFrameworkEntity>> {
        let timer = QueryTimer::new("find_compliance_framework");
        let row = sqlx::query_as::<_, ComplianceFrameworkEntity>(
            r#"
            SELECT id, name, description, version, status, requirements_count, compliance_score,
                   last_assessment, created_at, updated_at
            FROM compliance_frameworks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        timer.record();
        Ok(row)
    }

    pub async fn insert_framework(
        &self,
        input: &CreateFrameworkInput,
    ) -> PersistenceResult<ComplianceFrameworkEntity> {
        let timer = QueryTimer::new("create_compliance_framework");
        let row = sqlx::query_as::<_, ComplianceFrameworkEntity>(
            r#"
            INSERT INTO compliance_frameworks (name, description, version, status, compliance_score)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, description, version, status, requirements_count, compliance_score,
                      last_assessment, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.version)
        .bind(input.status.as_str())
        .bind(input.compliance_score)
        .fetch_one(&self.pool)
        .await?;
        timer.record();
        Ok(row)
    }

    pub async fn patch_framework(
        &self,
        id: Uuid,
        patch: &ColumnPatch,
    ) -> PersistenceResult<Option<ComplianceFrameworkEntity>> {
        let timer = QueryTimer::new("update_compliance_framework");
        let sql = format!(
            r#"
            UPDATE compliance_frameworks AS t
            SET {}, updated_at = NOW()
            FROM jsonb_populate_record(NULL::compliance_frameworks, $2) AS p
            WHERE t.id = $1
            RETURNING t.id, t.name, t.description, t.version, t.status, t.requirements_count,
                      t.compliance_score, t.last_assessment, t.created_at, t.updated_at
            "#,
            set_from_record(patch)?
        );
        let row = sqlx::query_as::<_, ComplianceFrameworkEntity>(&sql)
            .bind(id)
            .bind(JsonValue::Object(patch.clone()))
            .fetch_optional(&self.pool)
            .await?;
        timer.record();
        Ok(row)
    }

    /// Requirements go with the framework through `ON DELETE CASCADE`.
    pub async fn remove_framework(&self, id: Uuid) -> PersistenceResult<bool> {
        let timer = QueryTimer::new("delete_compliance_framework");
        let result = sqlx::query("DELETE FROM compliance_frameworks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(result.rows_affected() > 0)
    }

    pub async fn requirements_for(
        &self,
        framework_id: Uuid,
    ) -> PersistenceResult<Vec<ComplianceRequirementEntity>> {
        let timer = QueryTimer::new("list_compliance_requirements");
        let rows = sqlx::query_as::<_, ComplianceRequirementEntity>(
            r#"
            SELECT id, framework_id, code, title, description, status, evidence, due_date,
                   created_at, updated_at
            FROM compliance_requirements
            WHERE framework_id = $1
            ORDER BY code ASC, id ASC
            "#,
        )
        .bind(framework_id)
        .fetch_all(&self.pool)
        .await?;
        timer.record();
        Ok(rows)
    }

    /// Insert a requirement and bump its framework's count in one transaction.
    pub async fn insert_requirement(
        &self,
        input: &CreateRequirementInput,
    ) -> PersistenceResult<ComplianceRequirementEntity> {
        let timer = QueryTimer::new("create_compliance_requirement");
        let mut tx = self.pool.begin().await?;

        let bumped = sqlx::query(
            r#"
            UPDATE compliance_frameworks
            SET requirements_count = requirements_count + 1, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(input.framework_id)
        .execute(&mut *tx)
        .await?;
        if bumped.rows_affected() == 0 {
            return Err(StoreError::not_found("Compliance framework").into());
        }

        let row = sqlx::query_as::<_, ComplianceRequirementEntity>(
            r#"
            INSERT INTO compliance_requirements
                (framework_id, code, title, description, status, evidence, due_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, framework_id, code, title, description, status, evidence, due_date,
                      created_at, updated_at
            "#,
        )
        .bind(input.framework_id)
        .bind(&input.code)
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.status.as_str())
        .bind(&input.evidence)
        .bind(input.due_date)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();
        Ok(row)
    }

    pub async fn patch_requirement(
        &self,
        id: Uuid,
        patch: &ColumnPatch,
    ) -> PersistenceResult<Option<ComplianceRequirementEntity>> {
        let timer = QueryTimer::new("update_compliance_requirement");
        let sql = format!(
            r#"
            UPDATE compliance_requirements AS t
            SET {}, updated_at = NOW()
            FROM jsonb_populate_record(NULL::compliance_requirements, $2) AS p
            WHERE t.id = $1
            RETURNING t.id, t.framework_id, t.code, t.title, t.description, t.status,
                      t.evidence, t.due_date, t.created_at, t.updated_at
            "#,
            set_from_record(patch)?
        );
        let row = sqlx::query_as::<_, ComplianceRequirementEntity>(&sql)
            .bind(id)
            .bind(JsonValue::Object(patch.clone()))
            .fetch_optional(&self.pool)
            .await?;
        timer.record();
        Ok(row)
    }
}

#[async_trait]
impl ComplianceStore for ComplianceRepository {
    async fn list_frameworks(&self) -> StoreResult<Vec<ComplianceFramework>> {
        let rows = self.list_all_frameworks().await?;
        Ok(rows
            .into_iter()
            .map(ComplianceFramework::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn find_framework(&self, id: Uuid) -> StoreResult<Option<ComplianceFramework>> {
        let row = self.find_framework_by_id(id).await?;
        Ok(row.map(ComplianceFramework::try_from).transpose()?)
    }

    async fn create_framework(&self, input: &CreateFrameworkInput) -> StoreResult<ComplianceFramework> {
        Ok(self.insert_framework(input).await?.try_into()?)
    }

    async fn update_framework(
        &self,
        id: Uuid,
        patch: &ColumnPatch,
    ) -> StoreResult<Option<ComplianceFramework>> {
        let row = self.patch_framework(id, patch).await?;
        Ok(row.map(ComplianceFramework::try_from).transpose()?)
    }

    async fn delete_framework(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.remove_framework(id).await?)
    }

    async fn list_requirements(&self, framework_id: Uuid) -> StoreResult<Vec<ComplianceRequirement>> {
        let rows = self.requirements_for(framework_id).await?;
        Ok(rows
            .into_iter()
            .map(ComplianceRequirement::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn create_requirement(
        &self,
        input: &CreateRequirementInput,
    ) -> StoreResult<ComplianceRequirement> {
        Ok(self.insert_requirement(input).await?.try_into()?)
    }

    async fn update_requirement(
        &self,
        id: Uuid,
        patch: &ColumnPatch,
    ) -> StoreResult<Option<ComplianceRequirement>> {
        let row = self.patch_requirement(id, patch).await?;
        Ok(row.map(ComplianceRequirement::try_from).transpose()?)
    }
}
