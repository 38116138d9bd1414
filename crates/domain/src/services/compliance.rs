//! Compliance frameworks and requirements.
//!
//! Writes are recorded in `audit_logs` with resource types
//! `compliance_framework` and `compliance_requirement`.

use serde_json::{json, Map, Value};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::models::{
    ApiResponse, ComplianceFramework, ComplianceRequirement, CreateAuditLogInput,
    CreateFrameworkInput, CreateRequirementInput, UpdateFrameworkInput, UpdateRequirementInput,
    COMPLIANCE_FRAMEWORK_FIELDS, COMPLIANCE_REQUIREMENT_FIELDS,
};
use crate::services::audit::AuditDispatcher;
use crate::services::{patched_fields, storage_patch};
use crate::store::{ComplianceStore, StoreError, StoreResult};

const FRAMEWORK: &str = "compliance_framework";
const REQUIREMENT: &str = "compliance_requirement";

#[derive(Clone)]
pub struct ComplianceApi {
    store: Arc<dyn ComplianceStore>,
    audit: AuditDispatcher,
}

impl ComplianceApi {
    pub fn new(store: Arc<dyn ComplianceStore>, audit: AuditDispatcher) -> Self {
        Self { store, audit }
    }

    pub async fn get_frameworks(&self) -> ApiResponse<Vec<ComplianceFramework>> {
        ApiResponse::from_list_result(
            self.store.list_frameworks().await,
            "Failed to load compliance frameworks",
        )
    }

    pub async fn get_framework(&self, id: Uuid) -> ApiResponse<ComplianceFramework> {
        let result = self
            .store
            .find_framework(id)
            .await
            .and_then(|f| f.ok_or_else(|| StoreError::not_found("Compliance framework")));
        ApiResponse::from_result(result, "Failed to load compliance framework")
    }

    pub async fn create_framework(&self, input: CreateFrameworkInput) -> ApiResponse<ComplianceFramework> {
        ApiResponse::from_result(
            self.try_create_framework(input).await,
            "Failed to create compliance framework",
        )
    }

    async fn try_create_framework(&self, input: CreateFrameworkInput) -> StoreResult<ComplianceFramework> {
        input.validate()?;
        let framework = self.store.create_framework(&input).await?;

        self.audit.record_audit(
            CreateAuditLogInput::new("create", FRAMEWORK)
                .with_resource_id(framework.id)
                .with_details(json!({ "name": framework.name, "status": framework.status })),
        );
        Ok(framework)
    }

    pub async fn update_framework(
        &self,
        id: Uuid,
        patch: Map<String, Value>,
    ) -> ApiResponse<ComplianceFramework> {
        ApiResponse::from_result(
            self.try_update_framework(id, patch).await,
            "Failed to update compliance framework",
        )
    }

    async fn try_update_framework(
        &self,
        id: Uuid,
        patch: Map<String, Value>,
    ) -> StoreResult<ComplianceFramework> {
        let fields = patched_fields(&patch);
        let columns = storage_patch::<UpdateFrameworkInput>(&COMPLIANCE_FRAMEWORK_FIELDS, patch)?;
        let framework = self
            .store
            .update_framework(id, &columns)
            .await?
            .ok_or_else(|| StoreError::not_found("Compliance framework"))?;

        self.audit.record_audit(
            CreateAuditLogInput::new("update", FRAMEWORK)
                .with_resource_id(id)
                .with_details(json!({ "fields": fields })),
        );
        Ok(framework)
    }

    /// Delete a framework and its requirements; `data` is the deleted id.
    pub async fn delete_framework(&self, id: Uuid) -> ApiResponse<Uuid> {
        ApiResponse::from_result(
            self.try_delete_framework(id).await,
            "Failed to delete compliance framework",
        )
    }

    async fn try_delete_framework(&self, id: Uuid) -> StoreResult<Uuid> {
        if !self.store.delete_framework(id).await? {
            return Err(StoreError::not_found("Compliance framework"));
        }
        self.audit
            .record_audit(CreateAuditLogInput::new("delete", FRAMEWORK).with_resource_id(id));
        Ok(id)
    }

    pub async fn get_requirements(&self, framework_id: Uuid) -> ApiResponse<Vec<ComplianceRequirement>> {
        ApiResponse::from_list_result(
            self.store.list_requirements(framework_id).await,
            "Failed to load compliance requirements",
        )
    }

    pub async fn create_requirement(
        &self,
        input: CreateRequirementInput,
    ) -> ApiResponse<ComplianceRequirement> {
        ApiResponse::from_result(
            self.try_create_requirement(input).await,
            "Failed to create compliance requirement",
        )
    }

    async fn try_create_requirement(
        &self,
        input: CreateRequirementInput,
    ) -> StoreResult<ComplianceRequirement> {
        input.validate()?;
        let requirement = self.store.create_requirement(&input).await?;

        self.audit.record_audit(
            CreateAuditLogInput::new("create", REQUIREMENT)
                .with_resource_id(requirement.id)
                .with_details(json!({
                    "frameworkId": requirement.framework_id,
                    "code": requirement.code,
                })),
        );
        Ok(requirement)
    }

    pub async fn update_requirement(
        &self,
        id: Uuid,
        patch: Map<String, Value>,
    ) -> ApiResponse<ComplianceRequirement> {
        ApiResponse::from_result(
            self.try_update_requirement(id, patch).await,
            "Failed to update compliance requirement",
        )
    }

    async fn try_update_requirement(
        &self,
        id: Uuid,
        patch: Map<String, Value>,
    ) -> StoreResult<ComplianceRequirement> {
        let fields = patched_fields(&patch);
        let columns =
            storage_patch::<UpdateRequirementInput>(&COMPLIANCE_REQUIREMENT_FIELDS, patch)?;
        let requirement = self
            .store
            .update_requirement(id, &columns)
            .await?
            .ok_or_else(|| StoreError::not_found("Compliance requirement"))?;

        self.audit.record_audit(
            CreateAuditLogInput::new("update", REQUIREMENT)
                .with_resource_id(id)
                .with_details(json!({
                    "frameworkId": requirement.framework_id,
                    "fields": fields,
                })),
        );
        Ok(requirement)
    }
}
