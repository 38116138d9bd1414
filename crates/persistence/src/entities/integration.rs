//! Integration and integration log entities.

use chrono::{DateTime, Utc};
use domain::models::{Integration, IntegrationLog, INTEGRATION_FIELDS};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

use super::{map_row, parse_column};
use crate::error::DecodeError;

/// Database row mapping for the integrations table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct IntegrationEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub provider: String,
    pub integration_type: String,
    pub config: JsonValue,
    pub credentials: JsonValue,
    pub status: String,
    pub enabled: bool,
    pub last_sync: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<IntegrationEntity> for Integration {
    type Error = DecodeError;

    fn try_from(entity: IntegrationEntity) -> Result<Self, Self::Error> {
        map_row(&INTEGRATION_FIELDS, &entity)
    }
}

/// Database row mapping for the integration_logs table.
///
/// `integration_id` is not a foreign key: log rows outlive the integration.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct IntegrationLogEntity {
    pub id: Uuid,
    pub integration_id: Uuid,
    pub action: String,
    pub status: String,
    pub message: Option<String>,
    pub details: JsonValue,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<IntegrationLogEntity> for IntegrationLog {
    type Error = DecodeError;

    fn try_from(entity: IntegrationLogEntity) -> Result<Self, Self::Error> {
        Ok(Self {
            id: entity.id,
            integration_id: entity.integration_id,
            action: parse_column(&entity.action)?,
            status: parse_column(&entity.status)?,
            message: entity.message,
            details: entity.details,
            created_at: entity.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::{IntegrationAction, IntegrationType};
    use serde_json::json;

    #[test]
    fn test_integration_entity_to_domain() {
        let now = Utc::now();
        let entity = IntegrationEntity {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Sage Pastel".to_string(),
            provider: "sage".to_string(),
            integration_type: "accounting".to_string(),
            config: json!({"companyId": 12}),
            credentials: json!({}),
            status: "inactive".to_string(),
            enabled: false,
            last_sync: None,
            created_at: now,
            updated_at: now,
        };
        let integration = Integration::try_from(entity).unwrap();
        assert_eq!(integration.integration_type, IntegrationType::Accounting);
        assert_eq!(integration.config["companyId"], json!(12));
    }

    #[test]
    fn test_log_entity_to_domain() {
        let entity = IntegrationLogEntity {
            id: Uuid::new_v4(),
            integration_id: Uuid::new_v4(),
            action: "delete".to_string(),
            status: "success".to_string(),
            message: None,
            details: json!({}),
            created_at: Utc::now(),
        };
        let log = IntegrationLog::try_from(entity).unwrap();
        assert_eq!(log.action, IntegrationAction::Delete);
    }
}
