//! Third-party integration models (accounting packages, banks, payroll).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use shared::field_map::{FieldMap, FieldSpec};
use uuid::Uuid;
use validator::Validate;

string_enum! {
    IntegrationStatus {
        Active => "active",
        Inactive => "inactive",
        Error => "error",
        Syncing => "syncing",
    }
}

string_enum! {
    IntegrationType {
        Accounting => "accounting",
        Banking => "banking",
        Payroll => "payroll",
        Crm => "crm",
        Erp => "erp",
        Storage => "storage",
        Other => "other",
    }
}

string_enum! {
    /// Operation recorded in an integration log entry.
    IntegrationAction {
        Create => "create",
        Update => "update",
        Delete => "delete",
        Test => "test",
        Sync => "sync",
    }
}

string_enum! {
    IntegrationLogStatus {
        Success => "success",
        Error => "error",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Integration {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub provider: String,
    pub integration_type: IntegrationType,
    pub config: JsonValue,
    pub credentials: JsonValue,
    pub status: IntegrationStatus,
    pub enabled: bool,
    pub last_sync: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationLog {
    pub id: Uuid,
    pub integration_id: Uuid,
    pub action: IntegrationAction,
    pub status: IntegrationLogStatus,
    pub message: Option<String>,
    pub details: JsonValue,
    pub created_at: DateTime<Utc>,
}

/// An integration log entry waiting to be written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIntegrationLog {
    pub integration_id: Uuid,
    pub action: IntegrationAction,
    pub status: IntegrationLogStatus,
    pub message: Option<String>,
    pub details: JsonValue,
}

impl NewIntegrationLog {
    pub fn success(integration_id: Uuid, action: IntegrationAction) -> Self {
        Self {
            integration_id,
            action,
            status: IntegrationLogStatus::Success,
            message: None,
            details: JsonValue::Object(Default::default()),
        }
    }

    pub fn error(integration_id: Uuid, action: IntegrationAction, message: impl Into<String>) -> Self {
        Self {
            integration_id,
            action,
            status: IntegrationLogStatus::Error,
            message: Some(message.into()),
            details: JsonValue::Object(Default::default()),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_details(mut self, details: JsonValue) -> Self {
        self.details = details;
        self
    }
}

/// Outcome of a connection check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationTestResult {
    pub integration_id: Uuid,
    pub message: String,
    pub tested_at: DateTime<Utc>,
}

fn empty_object() -> JsonValue {
    JsonValue::Object(Default::default())
}

fn default_enabled() -> bool {
    true
}

/// Request payload for connecting an integration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateIntegrationInput {
    pub user_id: Uuid,

    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub name: String,

    #[validate(length(min = 1, max = 100, message = "Provider must be 1-100 characters"))]
    pub provider: String,

    pub integration_type: IntegrationType,

    #[serde(default = "empty_object")]
    #[validate(custom(function = "shared::validation::validate_json_object"))]
    pub config: JsonValue,

    #[serde(default = "empty_object")]
    #[validate(custom(function = "shared::validation::validate_json_object"))]
    pub credentials: JsonValue,

    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

/// Partial update of an integration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateIntegrationInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100, message = "Provider must be 1-100 characters"))]
    pub provider: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub integration_type: Option<IntegrationType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "shared::validation::validate_json_object"))]
    pub config: Option<JsonValue>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "shared::validation::validate_json_object"))]
    pub credentials: Option<JsonValue>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<IntegrationStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

pub const INTEGRATION_FIELDS: FieldMap = FieldMap::new(
    "integration",
    &[
        FieldSpec::read_only("id", "id"),
        FieldSpec::read_only("userId", "user_id"),
        FieldSpec::writable("name", "name"),
        FieldSpec::writable("provider", "provider"),
        FieldSpec::writable("integrationType", "integration_type"),
        FieldSpec::writable("config", "config"),
        FieldSpec::writable("credentials", "credentials"),
        FieldSpec::writable("status", "status"),
        FieldSpec::writable("enabled", "enabled"),
        FieldSpec::read_only("lastSync", "last_sync"),
        FieldSpec::read_only("createdAt", "created_at"),
        FieldSpec::read_only("updatedAt", "updated_at"),
    ],
);
