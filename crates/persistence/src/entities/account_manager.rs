//! Account manager, assignment, meeting and message entities.

use chrono::{DateTime, Utc};
use domain::models::{
    AccountManager, AccountManagerMeeting, AccountManagerMessage, UserAccountManager,
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::parse_column;
use crate::error::DecodeError;

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct AccountManagerEntity {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub status: String,
    pub total_clients: i32,
    pub specialties: Vec<String>,
    pub timezone: String,
}

impl TryFrom<AccountManagerEntity> for AccountManager {
    type Error = DecodeError;

    fn try_from(entity: AccountManagerEntity) -> Result<Self, Self::Error> {
        Ok(Self {
            id: entity.id,
            name: entity.name,
            email: entity.email,
            phone: entity.phone,
            status: parse_column(&entity.status)?,
            total_clients: entity.total_clients,
            specialties: entity.specialties,
            timezone: entity.timezone,
        })
    }
}

impl From<&AccountManager> for AccountManagerEntity {
    fn from(manager: &AccountManager) -> Self {
        Self {
            id: manager.id,
            name: manager.name.clone(),
            email: manager.email.clone(),
            phone: manager.phone.clone(),
            status: manager.status.as_str().to_string(),
            total_clients: manager.total_clients,
            specialties: manager.specialties.clone(),
            timezone: manager.timezone.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct UserAccountManagerEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub account_manager_id: Uuid,
    pub assigned_at: DateTime<Utc>,
}

impl From<UserAccountManagerEntity> for UserAccountManager {
    fn from(entity: UserAccountManagerEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            account_manager_id: entity.account_manager_id,
            assigned_at: entity.assigned_at,
        }
    }
}

/// Row of the account_manager_meetings table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct MeetingEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub account_manager_id: Uuid,
    pub title: String,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<MeetingEntity> for AccountManagerMeeting {
    type Error = DecodeError;

    fn try_from(entity: MeetingEntity) -> Result<Self, Self::Error> {
        Ok(Self {
            id: entity.id,
            user_id: entity.user_id,
            account_manager_id: entity.account_manager_id,
            title: entity.title,
            scheduled_at: entity.scheduled_at,
            duration_minutes: entity.duration_minutes,
            status: parse_column(&entity.status)?,
            notes: entity.notes,
            created_at: entity.created_at,
        })
    }
}

/// Row of the account_manager_messages table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct MessageEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub account_manager_id: Uuid,
    pub sender: String,
    pub content: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<MessageEntity> for AccountManagerMessage {
    type Error = DecodeError;

    fn try_from(entity: MessageEntity) -> Result<Self, Self::Error> {
        Ok(Self {
            id: entity.id,
            user_id: entity.user_id,
            account_manager_id: entity.account_manager_id,
            sender: parse_column(&entity.sender)?,
            content: entity.content,
            read: entity.read,
            created_at: entity.created_at,
        })
    }
}
