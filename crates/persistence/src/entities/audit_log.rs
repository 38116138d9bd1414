//! Audit log entity.

use chrono::{DateTime, Utc};
use domain::models::AuditLog;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Database entity for audit logs.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct AuditLogEntity {
    pub id: Uuid,

    /// User on whose behalf the action ran, if any.
    pub user_id: Option<Uuid>,

    pub action: String,
    pub resource_type: String,
    pub resource_id: Option<String>,
    pub details: serde_json::Value,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<AuditLogEntity> for AuditLog {
    fn from(entity: AuditLogEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            action: entity.action,
            resource_type: entity.resource_type,
            resource_id: entity.resource_id,
            details: entity.details,
            ip_address: entity.ip_address,
            user_agent: entity.user_agent,
            created_at: entity.created_at,
        }
    }
}
