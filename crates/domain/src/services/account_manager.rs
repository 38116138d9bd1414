//! Dedicated account managers: assignment, meetings and the message thread.

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::models::{
    AccountManager, AccountManagerMeeting, AccountManagerMessage, ApiResponse, AssignedManager,
    CreateMeetingInput, CreateMessageInput, MeetingStatus,
};
use crate::store::{AccountManagerStore, StoreError, StoreResult};

#[derive(Clone)]
pub struct AccountManagerApi {
    store: Arc<dyn AccountManagerStore>,
}

impl AccountManagerApi {
    pub fn new(store: Arc<dyn AccountManagerStore>) -> Self {
        Self { store }
    }

    pub async fn get_account_managers(&self) -> ApiResponse<Vec<AccountManager>> {
        ApiResponse::from_list_result(
            self.store.list_managers().await,
            "Failed to load account managers",
        )
    }

    /// The user's manager, or `data: null` when none is assigned yet.
    pub async fn get_assigned_manager(&self, user_id: Uuid) -> ApiResponse<Option<AssignedManager>> {
        ApiResponse::from_result(
            self.store.find_assignment(user_id).await,
            "Failed to load account manager",
        )
    }

    /// Assign the least-loaded active manager. Repeated calls return the same assignment.
    pub async fn assign_account_manager(&self, user_id: Uuid) -> ApiResponse<AssignedManager> {
        let result = self.store.assign_least_loaded(user_id).await;
        if let Ok(assigned) = &result {
            tracing::info!(
                user_id = %user_id,
                account_manager_id = %assigned.manager.id,
                total_clients = assigned.manager.total_clients,
                "Account manager assigned"
            );
        }
        ApiResponse::from_result(result, "Failed to assign account manager")
    }

    pub async fn schedule_meeting(&self, input: CreateMeetingInput) -> ApiResponse<AccountManagerMeeting> {
        ApiResponse::from_result(self.try_schedule(input).await, "Failed to schedule meeting")
    }

    async fn try_schedule(&self, input: CreateMeetingInput) -> StoreResult<AccountManagerMeeting> {
        input.validate()?;
        if input.scheduled_at <= Utc::now() {
            return Err(StoreError::Invalid(
                "Meeting must be scheduled in the future".to_string(),
            ));
        }
        self.store.create_meeting(&input).await
    }

    pub async fn get_meetings(&self, user_id: Uuid) -> ApiResponse<Vec<AccountManagerMeeting>> {
        ApiResponse::from_list_result(
            self.store.list_meetings(user_id).await,
            "Failed to load meetings",
        )
    }

    pub async fn update_meeting_status(
        &self,
        id: Uuid,
        status: MeetingStatus,
    ) -> ApiResponse<AccountManagerMeeting> {
        let result = self
            .store
            .update_meeting_status(id, status)
            .await
            .and_then(|meeting| meeting.ok_or_else(|| StoreError::not_found("Meeting")));
        ApiResponse::from_result(result, "Failed to update meeting")
    }

    pub async fn send_message(&self, input: CreateMessageInput) -> ApiResponse<AccountManagerMessage> {
        ApiResponse::from_result(self.try_send(input).await, "Failed to send message")
    }

    async fn try_send(&self, input: CreateMessageInput) -> StoreResult<AccountManagerMessage> {
        input.validate()?;
        self.store.create_message(&input).await
    }

    pub async fn get_messages(&self, user_id: Uuid) -> ApiResponse<Vec<AccountManagerMessage>> {
        ApiResponse::from_list_result(
            self.store.list_messages(user_id).await,
            "Failed to load messages",
        )
    }

    /// Mark the manager's messages to this user as read; `data` is the number updated.
    pub async fn mark_messages_read(&self, user_id: Uuid) -> ApiResponse<u64> {
        ApiResponse::from_result(
            self.store.mark_messages_read(user_id).await,
            "Failed to mark messages read",
        )
    }
}
