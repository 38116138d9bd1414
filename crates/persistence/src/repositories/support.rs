//! Support ticket and agent repository.

use async_trait::async_trait;
use domain::models::{CreateTicketInput, SupportAgent, SupportTicket, TicketAssignment};
use domain::store::{ColumnPatch, StoreResult, SupportStore};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use uuid::Uuid;

use super::{lock_assignments, set_from_record, SUPPORT_AGENT_ASSIGNMENT_LOCK};
use crate::entities::{SupportAgentEntity, SupportTicketEntity};
use crate::error::PersistenceResult;
use crate::metrics::QueryTimer;

const PICK_ONLINE_AGENT: &str = r#"
    SELECT id
    FROM support_agents
    WHERE status = 'online'
    ORDER BY active_tickets ASC, id ASC
    LIMIT 1"#;

#[derive(Clone)]
pub struct SupportRepository {
    pool: PgPool,
}

impl SupportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_by_user(&self, user_id: Uuid) -> PersistenceResult<Vec<SupportTicketEntity>> {
        let timer = QueryTimer::new("list_support_tickets");
        let rows = sqlx::query_as::<_, SupportTicketEntity>(
            r#"
            SELECT id, user_id, agent_id, subject, description, status, priority, category,
                   created_at, updated_at, resolved_at
            FROM support_tickets
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        timer.record();
        Ok(rows)
    }

    pub async fn find_by_id(&self, id: Uuid) -> PersistenceResult<Option<SupportTicketEntity>> {
        let timer = QueryTimer::new("find_support_ticket");
        let row = sqlx::query_as::<_, SupportTicketEntity>(
            r#"
            SELECT id, user_id, agent_id, subject, description, status, priority, category,
                   created_at, updated_at, resolved_at
            FROM support_tickets
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        timer.record();
        Ok(row)
    }

    /// Insert a ticket for the least-loaded online agent in one transaction.
    ///
    /// Picks are serialised by an advisory lock, so concurrent callers never
    /// read the same pre-increment count and always take the arg-min.
    pub async fn insert_assigned(
        &self,
        input: &CreateTicketInput,
    ) -> PersistenceResult<(SupportTicketEntity, Option<SupportAgentEntity>)> {
        let timer = QueryTimer::new("create_support_ticket");
        let mut tx = self.pool.begin().await?;

        lock_assignments(&mut *tx, SUPPORT_AGENT_ASSIGNMENT_LOCK).await?;
        let candidate = sqlx::query_scalar::<_, Uuid>(PICK_ONLINE_AGENT)
            .fetch_optional(&mut *tx)
            .await?;

        let agent = match candidate {
            Some(agent_id) => Some(
                sqlx::query_as::<_, SupportAgentEntity>(
                    r#"
                    UPDATE support_agents
                    SET active_tickets = active_tickets + 1
                    WHERE id = $1
                    RETURNING id, name, email, status, active_tickets, rating, specialties
                    "#,
                )
                .bind(agent_id)
                .fetch_one(&mut *tx)
                .await?,
            ),
            None => None,
        };

        let ticket = sqlx::query_as::<_, SupportTicketEntity>(
            r#"
            INSERT INTO support_tickets (user_id, agent_id, subject, description, status, priority, category)
            VALUES ($1, $2, $3, $4, 'open', $5, $6)
            RETURNING id, user_id, agent_id, subject, description, status, priority, category,
                      created_at, updated_at, resolved_at
            "#,
        )
        .bind(input.user_id)
        .bind(agent.as_ref().map(|a| a.id))
        .bind(&input.subject)
        .bind(&input.description)
        .bind(input.priority.as_str())
        .bind(input.category.as_str())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();
        Ok((ticket, agent))
    }

    pub async fn update(
        &self,
        id: Uuid,
        patch: &ColumnPatch,
    ) -> PersistenceResult<Option<SupportTicketEntity>> {
        let timer = QueryTimer::new("update_support_ticket");
        let sql = format!(
            r#"
            UPDATE support_tickets AS t
            SET {}, updated_at = NOW()
            FROM jsonb_populate_record(NULL::support_tickets, $2) AS p
            WHERE t.id = $1
            RETURNING t.id, t.user_id, t.agent_id, t.subject, t.description, t.status,
                      t.priority, t.category, t.created_at, t.updated_at, t.resolved_at
            "#,
            set_from_record(patch)?
        );
        let row = sqlx::query_as::<_, SupportTicketEntity>(&sql)
            .bind(id)
            .bind(JsonValue::Object(patch.clone()))
            .fetch_optional(&self.pool)
            .await?;
        timer.record();
        Ok(row)
    }

    pub async fn list_all_agents(&self) -> PersistenceResult<Vec<SupportAgentEntity>> {
        let timer = QueryTimer::new("list_support_agents");
        let rows = sqlx::query_as::<_, SupportAgentEntity>(
            r#"
            SELECT id, name, email, status, active_tickets, rating, specialties
            FROM support_agents
            ORDER BY name ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        timer.record();
        Ok(rows)
    }
}

#[async_trait]
impl SupportStore for SupportRepository {
    async fn list_tickets(&self, user_id: Uuid) -> StoreResult<Vec<SupportTicket>> {
        let rows = self.list_by_user(user_id).await?;
        Ok(rows
            .into_iter()
            .map(SupportTicket::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn find_ticket(&self, id: Uuid) -> StoreResult<Option<SupportTicket>> {
        Ok(self.find_by_id(id).await?.map(SupportTicket::try_from).transpose()?)
    }

    async fn create_ticket(&self, input: &CreateTicketInput) -> StoreResult<TicketAssignment> {
        let (ticket, agent) = self.insert_assigned(input).await?;
        Ok(TicketAssignment {
            ticket: ticket.try_into()?,
            agent: agent.map(SupportAgent::try_from).transpose()?,
        })
    }

    async fn update_ticket(&self, id: Uuid, patch: &ColumnPatch) -> StoreResult<Option<SupportTicket>> {
        let row = self.update(id, patch).await?;
        Ok(row.map(SupportTicket::try_from).transpose()?)
    }

    async fn list_agents(&self) -> StoreResult<Vec<SupportAgent>> {
        let rows = self.list_all_agents().await?;
        Ok(rows
            .into_iter()
            .map(SupportAgent::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }
}
