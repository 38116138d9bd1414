//! Compliance framework and requirement routes.

use axum::{
    extract::State,
    routing::{get, patch, post},
    Router,
};
use domain::models::{
    ComplianceFramework, ComplianceRequirement, CreateFrameworkInput, CreateRequirementInput,
};
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::Envelope;
use crate::app::AppState;
use crate::extractors::{JsonBody, PathParam};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/frameworks", get(list_frameworks).post(create_framework))
        .route(
            "/frameworks/:id",
            get(get_framework)
                .patch(update_framework)
                .delete(delete_framework),
        )
        .route("/frameworks/:id/requirements", get(list_requirements))
        .route("/requirements", post(create_requirement))
        .route("/requirements/:id", patch(update_requirement))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedFramework {
    pub id: Uuid,
}

pub async fn list_frameworks(State(state): State<AppState>) -> Envelope<Vec<ComplianceFramework>> {
    Envelope::ok(state.services.compliance.get_frameworks().await)
}

pub async fn get_framework(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Envelope<ComplianceFramework> {
    Envelope::ok(state.services.compliance.get_framework(id).await)
}

pub async fn create_framework(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateFrameworkInput>,
) -> Envelope<ComplianceFramework> {
    Envelope::created(state.services.compliance.create_framework(input).await)
}

pub async fn update_framework(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(patch): JsonBody<Map<String, Value>>,
) -> Envelope<ComplianceFramework> {
    Envelope::ok(state.services.compliance.update_framework(id, patch).await)
}

/// Requirements of the framework are removed with it.
pub async fn delete_framework(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Envelope<DeletedFramework> {
    Envelope::ok(
        state
            .services
            .compliance
            .delete_framework(id)
            .await
            .map(|id| DeletedFramework { id }),
    )
}

pub async fn list_requirements(
    State(state): State<AppState>,
    PathParam(framework_id): PathParam<Uuid>,
) -> Envelope<Vec<ComplianceRequirement>> {
    Envelope::ok(state.services.compliance.get_requirements(framework_id).await)
}

pub async fn create_requirement(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateRequirementInput>,
) -> Envelope<ComplianceRequirement> {
    Envelope::created(state.services.compliance.create_requirement(input).await)
}

pub async fn update_requirement(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(patch): JsonBody<Map<String, Value>>,
) -> Envelope<ComplianceRequirement> {
    Envelope::ok(state.services.compliance.update_requirement(id, patch).await)
}
