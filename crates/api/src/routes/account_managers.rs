//! Account manager routes: directory, per-user assignment, meetings and the
//! message thread.

use axum::{
    extract::State,
    routing::{get, patch, post},
    Router,
};
use domain::models::{
    AccountManager, AccountManagerMeeting, AccountManagerMessage, AssignedManager,
    CreateMeetingInput, CreateMessageInput, MeetingStatus,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Envelope;
use crate::app::AppState;
use crate::extractors::{JsonBody, PathParam, QueryParams, UserQuery};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/account-managers", get(list_account_managers))
        .route(
            "/users/:user_id/account-manager",
            get(get_assigned_manager).post(assign_account_manager),
        )
        .route(
            "/users/:user_id/account-manager/messages/read",
            post(mark_messages_read),
        )
        .route(
            "/account-managers/meetings",
            get(list_meetings).post(schedule_meeting),
        )
        .route("/account-managers/meetings/:id", patch(update_meeting_status))
        .route(
            "/account-managers/messages",
            get(list_messages).post(send_message),
        )
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MeetingStatusBody {
    pub status: MeetingStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkedRead {
    pub marked_read: u64,
}

pub async fn list_account_managers(State(state): State<AppState>) -> Envelope<Vec<AccountManager>> {
    Envelope::ok(state.services.account_managers.get_account_managers().await)
}

/// `data` is `null` when the user has no manager yet.
pub async fn get_assigned_manager(
    State(state): State<AppState>,
    PathParam(user_id): PathParam<Uuid>,
) -> Envelope<Option<AssignedManager>> {
    Envelope::ok(
        state
            .services
            .account_managers
            .get_assigned_manager(user_id)
            .await,
    )
}

/// Returns the existing assignment unchanged when there is one.
pub async fn assign_account_manager(
    State(state): State<AppState>,
    PathParam(user_id): PathParam<Uuid>,
) -> Envelope<AssignedManager> {
    Envelope::ok(
        state
            .services
            .account_managers
            .assign_account_manager(user_id)
            .await,
    )
}

pub async fn list_meetings(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<UserQuery>,
) -> Envelope<Vec<AccountManagerMeeting>> {
    Envelope::ok(state.services.account_managers.get_meetings(query.user_id).await)
}

pub async fn schedule_meeting(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateMeetingInput>,
) -> Envelope<AccountManagerMeeting> {
    Envelope::created(state.services.account_managers.schedule_meeting(input).await)
}

pub async fn update_meeting_status(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(body): JsonBody<MeetingStatusBody>,
) -> Envelope<AccountManagerMeeting> {
    Envelope::ok(
        state
            .services
            .account_managers
            .update_meeting_status(id, body.status)
            .await,
    )
}

pub async fn list_messages(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<UserQuery>,
) -> Envelope<Vec<AccountManagerMessage>> {
    Envelope::ok(state.services.account_managers.get_messages(query.user_id).await)
}

pub async fn send_message(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateMessageInput>,
) -> Envelope<AccountManagerMessage> {
    Envelope::created(state.services.account_managers.send_message(input).await)
}

pub async fn mark_messages_read(
    State(state): State<AppState>,
    PathParam(user_id): PathParam<Uuid>,
) -> Envelope<MarkedRead> {
    let result = state
        .services
        .account_managers
        .mark_messages_read(user_id)
        .await
        .map(|marked_read| MarkedRead { marked_read });
    Envelope::ok(result)
}
