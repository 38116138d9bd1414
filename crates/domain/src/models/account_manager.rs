//! Dedicated account manager models: managers, assignments, meetings and messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

string_enum! {
    /// Whether a manager accepts new clients.
    AccountManagerStatus {
        Active => "active",
        Inactive => "inactive",
    }
}

string_enum! {
    MeetingStatus {
        Scheduled => "scheduled",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

string_enum! {
    MessageSender {
        User => "user",
        Manager => "manager",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountManager {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub status: AccountManagerStatus,
    pub total_clients: i32,
    pub specialties: Vec<String>,
    pub timezone: String,
}

/// The 1:1 link between a user and their account manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccountManager {
    pub id: Uuid,
    pub user_id: Uuid,
    pub account_manager_id: Uuid,
    pub assigned_at: DateTime<Utc>,
}

/// A user's assignment together with the manager record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedManager {
    pub assignment: UserAccountManager,
    pub manager: AccountManager,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountManagerMeeting {
    pub id: Uuid,
    pub user_id: Uuid,
    pub account_manager_id: Uuid,
    pub title: String,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub status: MeetingStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountManagerMessage {
    pub id: Uuid,
    pub user_id: Uuid,
    pub account_manager_id: Uuid,
    pub sender: MessageSender,
    pub content: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

fn default_duration() -> i32 {
    30
}

/// Request payload for booking a meeting with a manager.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMeetingInput {
    pub user_id: Uuid,
    pub account_manager_id: Uuid,

    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub title: String,

    pub scheduled_at: DateTime<Utc>,

    #[serde(default = "default_duration")]
    #[validate(range(min = 15, max = 240, message = "Duration must be 15-240 minutes"))]
    pub duration_minutes: i32,

    #[validate(length(max = 2000, message = "Notes must be at most 2000 characters"))]
    pub notes: Option<String>,
}

fn default_sender() -> MessageSender {
    MessageSender::User
}

/// Request payload for sending a message in the user/manager thread.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMessageInput {
    pub user_id: Uuid,
    pub account_manager_id: Uuid,

    #[serde(default = "default_sender")]
    pub sender: MessageSender,

    #[validate(length(min = 1, max = 5000, message = "Message must be 1-5000 characters"))]
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub content: String,
}
