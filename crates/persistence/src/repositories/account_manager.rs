//! Account manager repository: managers, assignments, meetings and messages.

use async_trait::async_trait;
use domain::models::{
    AccountManager, AccountManagerMeeting, AccountManagerMessage, AssignedManager,
    CreateMeetingInput, CreateMessageInput, MeetingStatus,
};
use domain::store::{AccountManagerStore, StoreError, StoreResult};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use super::{lock_assignments, ACCOUNT_MANAGER_ASSIGNMENT_LOCK};
use crate::entities::{
    AccountManagerEntity, MeetingEntity, MessageEntity, UserAccountManagerEntity,
};
use crate::error::{PersistenceError, PersistenceResult};
use crate::metrics::QueryTimer;

const PICK_ACTIVE_MANAGER: &str = r#"
    SELECT id
    FROM account_managers
    WHERE status = 'active'
    ORDER BY total_clients ASC, id ASC
    LIMIT 1"#;

#[derive(Clone)]
pub struct AccountManagerRepository {
    pool: PgPool,
}

impl AccountManagerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_all(&self) -> PersistenceResult<Vec<AccountManagerEntity>> {
        let timer = QueryTimer::new("list_account_managers");
        let rows = sqlx::query_as::<_, AccountManagerEntity>(
            r#"
            SELECT id, name, email, phone, status, total_clients, specialties, timezone
            FROM account_managers
            ORDER BY name ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        timer.record();
        Ok(rows)
    }

    pub async fn find_for_user(
        &self,
        user_id: Uuid,
    ) -> PersistenceResult<Option<(UserAccountManagerEntity, AccountManagerEntity)>> {
        let timer = QueryTimer::new("find_user_account_manager");
        let mut conn = self.pool.acquire().await?;
        let found = Self::assignment_for_user(&mut conn, user_id).await?;
        timer.record();
        Ok(found)
    }

    async fn assignment_for_user(
        conn: &mut PgConnection,
        user_id: Uuid,
    ) -> PersistenceResult<Option<(UserAccountManagerEntity, AccountManagerEntity)>> {
        let assignment = sqlx::query_as::<_, UserAccountManagerEntity>(
            r#"
            SELECT id, user_id, account_manager_id, assigned_at
            FROM user_account_managers
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?;

        let Some(assignment) = assignment else {
            return Ok(None);
        };

        let manager = sqlx::query_as::<_, AccountManagerEntity>(
            r#"
            SELECT id, name, email, phone, status, total_clients, specialties, timezone
            FROM account_managers
            WHERE id = $1
            "#,
        )
        .bind(assignment.account_manager_id)
        .fetch_one(&mut *conn)
        .await?;

        Ok(Some((assignment, manager)))
    }

    /// Assign the active manager with the fewest clients, unless the user
    /// already has one. Runs in one transaction.
    pub async fn assign(
        &self,
        user_id: Uuid,
    ) -> PersistenceResult<(UserAccountManagerEntity, AccountManagerEntity)> {
        let timer = QueryTimer::new("assign_account_manager");
        let mut tx = self.pool.begin().await?;
        lock_assignments(&mut *tx, ACCOUNT_MANAGER_ASSIGNMENT_LOCK).await?;

        if let Some(existing) = Self::assignment_for_user(&mut tx, user_id).await? {
            tx.commit().await?;
            timer.record();
            return Ok(existing);
        }

        let candidate = sqlx::query_scalar::<_, Uuid>(PICK_ACTIVE_MANAGER)
            .fetch_optional(&mut *tx)
            .await?;
        let manager_id = candidate
            .ok_or_else(|| StoreError::NotFound("No available account manager".to_string()))?;

        let manager = sqlx::query_as::<_, AccountManagerEntity>(
            r#"
            UPDATE account_managers
            SET total_clients = total_clients + 1
            WHERE id = $1
            RETURNING id, name, email, phone, status, total_clients, specialties, timezone
            "#,
        )
        .bind(manager_id)
        .fetch_one(&mut *tx)
        .await?;

        let inserted = sqlx::query_as::<_, UserAccountManagerEntity>(
            r#"
            INSERT INTO user_account_managers (user_id, account_manager_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO NOTHING
            RETURNING id, user_id, account_manager_id, assigned_at
            "#,
        )
        .bind(user_id)
        .bind(manager.id)
        .fetch_optional(&mut *tx)
        .await?;

        let result = match inserted {
            Some(assignment) => {
                tx.commit().await?;
                (assignment, manager)
            }
            None => {
                // A concurrent request assigned this user first; undo the increment.
                tx.rollback().await?;
                self.find_for_user(user_id)
                    .await?
                    .ok_or_else(|| PersistenceError::from(sqlx::Error::RowNotFound))?
            }
        };
        timer.record();
        Ok(result)
    }

    pub async fn insert_meeting(&self, input: &CreateMeetingInput) -> PersistenceResult<MeetingEntity> {
        let timer = QueryTimer::new("create_account_manager_meeting");
        let row = sqlx::query_as::<_, MeetingEntity>(
            r#"
            INSERT INTO account_manager_meetings
                (user_id, account_manager_id, title, scheduled_at, duration_minutes, status, notes)
            VALUES ($1, $2, $3, $4, $5, 'scheduled', $6)
            RETURNING id, user_id, account_manager_id, title, scheduled_at, duration_minutes,
                      status, notes, created_at
            "#,
        )
        .bind(input.user_id)
        .bind(input.account_manager_id)
        .bind(&input.title)
        .bind(input.scheduled_at)
        .bind(input.duration_minutes)
        .bind(&input.notes)
        .fetch_one(&self.pool)
        .await?;
        timer.record();
        Ok(row)
    }

    pub async fn meetings_for_user(&self, user_id: Uuid) -> PersistenceResult<Vec<MeetingEntity>> {
        let timer = QueryTimer::new("list_account_manager_meetings");
        let rows = sqlx::query_as::<_, MeetingEntity>(
            r#"
            SELECT id, user_id, account_manager_id, title, scheduled_at, duration_minutes,
                   status, notes, created_at
            FROM account_manager_meetings
            WHERE user_id = $1
            ORDER BY scheduled_at ASC, id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        timer.record();
        Ok(rows)
    }

    pub async fn set_meeting_status(
        &self,
        id: Uuid,
        status: MeetingStatus,
    ) -> PersistenceResult<Option<MeetingEntity>> {
        let timer = QueryTimer::new("update_account_manager_meeting");
        let row = sqlx::query_as::<_, MeetingEntity>(
            r#"
            UPDATE account_manager_meetings
            SET status = $2
            WHERE id = $1
            RETURNING id, user_id, account_manager_id, title, scheduled_at, duration_minutes,
                      status, notes, created_at
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?;
        timer.record();
        Ok(row)
    }

    pub async fn insert_message(&self, input: &CreateMessageInput) -> PersistenceResult<MessageEntity> {
        let timer = QueryTimer::new("create_account_manager_message");
        let row = sqlx::query_as::<_, MessageEntity>(
            r#"
            INSERT INTO account_manager_messages (user_id, account_manager_id, sender, content)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, account_manager_id, sender, content, read, created_at
            "#,
        )
        .bind(input.user_id)
        .bind(input.account_manager_id)
        .bind(input.sender.as_str())
        .bind(&input.content)
        .fetch_one(&self.pool)
        .await?;
        timer.record();
        Ok(row)
    }

    pub async fn messages_for_user(&self, user_id: Uuid) -> PersistenceResult<Vec<MessageEntity>> {
        let timer = QueryTimer::new("list_account_manager_messages");
        let rows = sqlx::query_as::<_, MessageEntity>(
            r#"
            SELECT id, user_id, account_manager_id, sender, content, read, created_at
            FROM account_manager_messages
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

    pub async fn mark_read(&self, user_id: Uuid) -> PersistenceResult<u64> {
        let timer = QueryTimer::new("mark_account_manager_messages_read");
        let result = sqlx::query(
            r#"
            UPDATE account_manager_messages
            SET read = TRUE
            WHERE user_id = $1 AND sender = 'manager' AND read = FALSE
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }
}

fn assigned(
    (assignment, manager): (UserAccountManagerEntity, AccountManagerEntity),
) -> StoreResult<AssignedManager> {
    Ok(AssignedManager {
        assignment: assignment.into(),
        manager: manager.try_into()?,
    })
}

#[async_trait]
impl AccountManagerStore for AccountManagerRepository {
    async fn list_managers(&self) -> StoreResult<Vec<AccountManager>> {
        let rows = self.list_all().await?;
        Ok(rows
            .into_iter()
            .map(AccountManager::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn find_assignment(&self, user_id: Uuid) -> StoreResult<Option<AssignedManager>> {
        self.find_for_user(user_id).await?.map(assigned).transpose()
    }

    async fn assign_least_loaded(&self, user_id: Uuid) -> StoreResult<AssignedManager> {
        assigned(self.assign(user_id).await?)
    }

    async fn create_meeting(&self, input: &CreateMeetingInput) -> StoreResult<AccountManagerMeeting> {
        Ok(self.insert_meeting(input).await?.try_into()?)
    }

    async fn list_meetings(&self, user_id: Uuid) -> StoreResult<Vec<AccountManagerMeeting>> {
        let rows = self.meetings_for_user(user_id).await?;
        Ok(rows
            .into_iter()
            .map(AccountManagerMeeting::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn update_meeting_status(
        &self,
        id: Uuid,
        status: MeetingStatus,
    ) -> StoreResult<Option<AccountManagerMeeting>> {
        let row = self.set_meeting_status(id, status).await?;
        Ok(row.map(AccountManagerMeeting::try_from).transpose()?)
    }

    async fn create_message(&self, input: &CreateMessageInput) -> StoreResult<AccountManagerMessage> {
        Ok(self.insert_message(input).await?.try_into()?)
    }

    async fn list_messages(&self, user_id: Uuid) -> StoreResult<Vec<AccountManagerMessage>> {
        let rows = self.messages_for_user(user_id).await?;
        Ok(rows
            .into_iter()
            .map(AccountManagerMessage::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn mark_messages_read(&self, user_id: Uuid) -> StoreResult<u64> {
        Ok(self.mark_read(user_id).await?)
    }
}
