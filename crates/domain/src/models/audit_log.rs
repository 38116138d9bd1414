//! Audit log domain models.
//!
//! Entries are append-only. `details` is free-form JSON chosen by the writer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use shared::pagination::{PageRequest, Pagination};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub action: String,
    pub resource_type: String,
    pub resource_id: Option<String>,
    pub details: JsonValue,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

fn empty_details() -> JsonValue {
    JsonValue::Object(Default::default())
}

/// Input for writing an audit log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAuditLogInput {
    pub user_id: Option<Uuid>,

    #[validate(length(min = 1, max = 100, message = "Action must be 1-100 characters"))]
    pub action: String,

    #[validate(length(min = 1, max = 100, message = "Resource type must be 1-100 characters"))]
    pub resource_type: String,

    pub resource_id: Option<String>,

    #[serde(default = "empty_details")]
    pub details: JsonValue,

    pub ip_address: Option<String>,

    pub user_agent: Option<String>,
}

impl CreateAuditLogInput {
    /// Entry for a system-initiated action on a resource.
    pub fn new(action: impl Into<String>, resource_type: impl Into<String>) -> Self {
        Self {
            user_id: None,
            action: action.into(),
            resource_type: resource_type.into(),
            resource_id: None,
            details: empty_details(),
            ip_address: None,
            user_agent: None,
        }
    }

    pub fn with_user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_resource_id(mut self, id: impl ToString) -> Self {
        self.resource_id = Some(id.to_string());
        self
    }

    pub fn with_details(mut self, details: JsonValue) -> Self {
        self.details = details;
        self
    }
}

/// Filters for listing audit logs. All filters are optional and combine with AND.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAuditLogsQuery {
    pub user_id: Option<Uuid>,
    pub action: Option<String>,
    pub resource_type: Option<String>,
    pub resource_id: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ListAuditLogsQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.per_page)
    }

    /// Whether an entry passes every filter set on this query.
    pub fn matches(&self, log: &AuditLog) -> bool {
        self.user_id.map_or(true, |id| log.user_id == Some(id))
            && self.action.as_ref().map_or(true, |a| &log.action == a)
            && self
                .resource_type
                .as_ref()
                .map_or(true, |t| &log.resource_type == t)
            && self
                .resource_id
                .as_ref()
                .map_or(true, |id| log.resource_id.as_ref() == Some(id))
            && self.from.map_or(true, |from| log.created_at >= from)
            && self.to.map_or(true, |to| log.created_at <= to)
    }
}

/// One page of audit log entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogPage {
    pub logs: Vec<AuditLog>,
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    fn sample(action: &str, resource_type: &str) -> AuditLog {
        AuditLog {
            id: Uuid::new_v4(),
            user_id: None,
            action: action.to_string(),
            resource_type: resource_type.to_string(),
            resource_id: Some("42".to_string()),
            details: json!({}),
            ip_address: None,
            user_agent: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_builder() {
        let user = Uuid::new_v4();
        let input = CreateAuditLogInput::new("framework.update", "compliance_framework")
            .with_user(user)
            .with_resource_id(7)
            .with_details(json!({"fields": ["status"]}));
        assert_eq!(input.user_id, Some(user));
        assert_eq!(input.resource_id.as_deref(), Some("7"));
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_empty_action_rejected() {
        let input = CreateAuditLogInput::new("", "integration");
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_query_matches_filters() {
        let log = sample("framework.create", "compliance_framework");
        assert!(ListAuditLogsQuery::default().matches(&log));

        let query = ListAuditLogsQuery {
            action: Some("framework.create".into()),
            resource_id: Some("42".into()),
            ..Default::default()
        };
        assert!(query.matches(&log));

        let query = ListAuditLogsQuery {
            resource_type: Some("integration".into()),
            ..Default::default()
        };
        assert!(!query.matches(&log));
    }

    #[test]
    fn test_query_matches_time_window() {
        let log = sample("x", "y");
        let query = ListAuditLogsQuery {
            from: Some(log.created_at + Duration::seconds(1)),
            ..Default::default()
        };
        assert!(!query.matches(&log));

        let query = ListAuditLogsQuery {
            from: Some(log.created_at - Duration::hours(1)),
            to: Some(log.created_at + Duration::hours(1)),
            ..Default::default()
        };
        assert!(query.matches(&log));
    }

    #[test]
    fn test_page_request_defaults() {
        let page = ListAuditLogsQuery::default().page_request();
        assert_eq!(page.page, 1);
        assert_eq!(page.per_page, 50);
    }
}
