//! Third-party integration routes.

use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use domain::models::{CreateIntegrationInput, Integration, IntegrationLog, IntegrationTestResult};
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::Envelope;
use crate::app::AppState;
use crate::extractors::{JsonBody, PathParam, QueryParams, UserQuery};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_integrations).post(create_integration))
        .route(
            "/:id",
            get(get_integration)
                .patch(update_integration)
                .delete(delete_integration),
        )
        .route("/:id/test", post(test_integration))
        .route("/:id/sync", post(sync_integration))
        .route("/:id/logs", get(list_integration_logs))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedIntegration {
    pub id: Uuid,
}

pub async fn list_integrations(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<UserQuery>,
) -> Envelope<Vec<Integration>> {
    Envelope::ok(state.services.integrations.get_integrations(query.user_id).await)
}

pub async fn get_integration(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Envelope<Integration> {
    Envelope::ok(state.services.integrations.get_integration(id).await)
}

pub async fn create_integration(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateIntegrationInput>,
) -> Envelope<Integration> {
    Envelope::created(state.services.integrations.create_integration(input).await)
}

pub async fn update_integration(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(patch): JsonBody<Map<String, Value>>,
) -> Envelope<Integration> {
    Envelope::ok(state.services.integrations.update_integration(id, patch).await)
}

pub async fn delete_integration(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Envelope<DeletedIntegration> {
    Envelope::ok(
        state
            .services
            .integrations
            .delete_integration(id)
            .await
            .map(|id| DeletedIntegration { id }),
    )
}

pub async fn test_integration(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Envelope<IntegrationTestResult> {
    Envelope::ok(state.services.integrations.test_integration(id).await)
}

pub async fn sync_integration(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Envelope<Integration> {
    Envelope::ok(state.services.integrations.sync_integration(id).await)
}

pub async fn list_integration_logs(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Envelope<Vec<IntegrationLog>> {
    Envelope::ok(state.services.integrations.get_integration_logs(id).await)
}
