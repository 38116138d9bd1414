//! Audit log repository.

use async_trait::async_trait;
use domain::models::{AuditLog, CreateAuditLogInput, ListAuditLogsQuery};
use domain::store::{AuditStore, StoreResult};
use shared::pagination::PageRequest;
use sqlx::PgPool;

use crate::entities::AuditLogEntity;
use crate::error::PersistenceResult;
use crate::metrics::QueryTimer;

/// WHERE clause for the filters set on a query, with `$n` placeholders in bind order.
struct AuditLogFilter {
    conditions: Vec<String>,
    param_count: usize,
}

impl AuditLogFilter {
    fn build(query: &ListAuditLogsQuery) -> Self {
        let mut filter = Self {
            conditions: Vec::new(),
            param_count: 0,
        };

        if query.user_id.is_some() {
            filter.push("user_id =");
        }
        if query.action.is_some() {
            filter.push("action =");
        }
        if query.resource_type.is_some() {
            filter.push("resource_type =");
        }
        if query.resource_id.is_some() {
            filter.push("resource_id =");
        }
        if query.from.is_some() {
            filter.push("created_at >=");
        }
        if query.to.is_some() {
            filter.push("created_at <=");
        }

        filter
    }

    fn push(&mut self, condition: &str) {
        self.param_count += 1;
        self.conditions
            .push(format!("{} ${}", condition, self.param_count));
    }

    fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            "TRUE".to_string()
        } else {
            self.conditions.join(" AND ")
        }
    }
}

/// Bind the filter values in the order [`AuditLogFilter::build`] numbered them.
macro_rules! bind_query_filters {
    ($builder:expr, $query:expr) => {{
        let mut b = $builder;
        if let Some(ref user_id) = $query.user_id {
            b = b.bind(user_id);
        }
        if let Some(ref action) = $query.action {
            b = b.bind(action);
        }
        if let Some(ref resource_type) = $query.resource_type {
            b = b.bind(resource_type);
        }
        if let Some(ref resource_id) = $query.resource_id {
            b = b.bind(resource_id);
        }
        if let Some(ref from) = $query.from {
            b = b.bind(from);
        }
        if let Some(ref to) = $query.to {
            b = b.bind(to);
        }
        b
    }};
}

/// Repository for audit log database operations.
#[derive(Clone)]
pub struct AuditLogRepository {
    pool: PgPool,
}

impl AuditLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, input: &CreateAuditLogInput) -> PersistenceResult<AuditLogEntity> {
        let timer = QueryTimer::new("create_audit_log");
        let row = sqlx::query_as::<_, AuditLogEntity>(
            r#"
            INSERT INTO audit_logs
                (user_id, action, resource_type, resource_id, details, ip_address, user_agent)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, user_id, action, resource_type, resource_id, details, ip_address,
                      user_agent, created_at
            "#,
        )
        .bind(input.user_id)
        .bind(&input.action)
        .bind(&input.resource_type)
        .bind(&input.resource_id)
        .bind(&input.details)
        .bind(&input.ip_address)
        .bind(&input.user_agent)
        .fetch_one(&self.pool)
        .await?;
        timer.record();
        Ok(row)
    }

    /// One page of matching entries, newest first, and the total match count.
    pub async fn list(
        &self,
        query: &ListAuditLogsQuery,
        page: PageRequest,
    ) -> PersistenceResult<(Vec<AuditLogEntity>, i64)> {
        let timer = QueryTimer::new("list_audit_logs");
        let filter = AuditLogFilter::build(query);
        let where_clause = filter.where_clause();

        let count_query = format!("SELECT COUNT(*) FROM audit_logs WHERE {}", where_clause);
        let count_builder = sqlx::query_scalar::<_, i64>(&count_query);
        let total: i64 = bind_query_filters!(count_builder, query)
            .fetch_one(&self.pool)
            .await?;

        let list_query = format!(
            r#"
            SELECT id, user_id, action, resource_type, resource_id, details, ip_address,
                   user_agent, created_at
            FROM audit_logs
            WHERE {}
            ORDER BY created_at DESC, id DESC
            LIMIT ${} OFFSET ${}
            "#,
            where_clause,
            filter.param_count + 1,
            filter.param_count + 2
        );
        let list_builder = sqlx::query_as::<_, AuditLogEntity>(&list_query);
        let rows = bind_query_filters!(list_builder, query)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        timer.record();
        Ok((rows, total))
    }
}

#[async_trait]
impl AuditStore for AuditLogRepository {
    async fn insert_audit_log(&self, input: &CreateAuditLogInput) -> StoreResult<AuditLog> {
        Ok(self.insert(input).await?.into())
    }

    async fn list_audit_logs(
        &self,
        query: &ListAuditLogsQuery,
        page: PageRequest,
    ) -> StoreResult<(Vec<AuditLog>, i64)> {
        let (rows, total) = self.list(query, page).await?;
        Ok((rows.into_iter().map(AuditLog::from).collect(), total))
    }
}
