//! Database entity definitions.
//!
//! Entities are direct mappings to database rows. Enumerations are stored as
//! TEXT and parsed when an entity is turned into its domain model. Both the
//! PostgreSQL repositories and the memory store keep rows in this shape.

pub mod account_manager;
pub mod audit_log;
pub mod compliance;
pub mod integration;
pub mod support;
pub mod system_metrics;

use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use shared::field_map::FieldMap;

use crate::error::DecodeError;

pub use account_manager::{
    AccountManagerEntity, MeetingEntity, MessageEntity, UserAccountManagerEntity,
};
pub use audit_log::AuditLogEntity;
pub use compliance::{ComplianceFrameworkEntity, ComplianceRequirementEntity};
pub use integration::{IntegrationEntity, IntegrationLogEntity};
pub use support::{SupportAgentEntity, SupportTicketEntity};
pub use system_metrics::{IncidentReportEntity, SlaMetricEntity, SystemMetricEntity};

/// Parse a TEXT column into its domain enumeration.
pub(crate) fn parse_column<T>(value: &str) -> Result<T, DecodeError>
where
    T: FromStr<Err = String>,
{
    value.parse::<T>().map_err(DecodeError::from)
}

/// Map a snake_case row to its camelCase domain model through a field map.
///
/// Columns without an entry in `fields` are dropped before the model is built.
pub(crate) fn map_row<E, T>(fields: &FieldMap, row: &E) -> Result<T, DecodeError>
where
    E: Serialize,
    T: DeserializeOwned,
{
    let columns = match serde_json::to_value(row) {
        Ok(Value::Object(columns)) => columns,
        Ok(_) => return Err(DecodeError(format!("{} row is not a record", fields.resource()))),
        Err(e) => return Err(DecodeError(e.to_string())),
    };
    serde_json::from_value(Value::Object(fields.to_api(&columns)))
        .map_err(|e| DecodeError(format!("Invalid {} row: {}", fields.resource(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::TicketStatus;

    #[test]
    fn test_parse_column() {
        assert_eq!(
            parse_column::<TicketStatus>("in-progress").unwrap(),
            TicketStatus::InProgress
        );
        assert!(parse_column::<TicketStatus>("in_progress").is_err());
    }

    #[derive(Serialize)]
    struct WidgetRow {
        id: u32,
        display_name: &'static str,
        internal_note: &'static str,
    }

    #[derive(Debug, PartialEq, serde::Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Widget {
        id: u32,
        display_name: String,
    }

    const WIDGET_FIELDS: FieldMap = FieldMap::new(
        "widget",
        &[
            shared::field_map::FieldSpec::read_only("id", "id"),
            shared::field_map::FieldSpec::writable("displayName", "display_name"),
        ],
    );

    #[test]
    fn test_map_row_renames_and_drops_columns() {
        let row = WidgetRow {
            id: 7,
            display_name: "Sage",
            internal_note: "hidden",
        };
        let widget: Widget = map_row(&WIDGET_FIELDS, &row).unwrap();
        assert_eq!(
            widget,
            Widget {
                id: 7,
                display_name: "Sage".to_string()
            }
        );
    }

    #[test]
    fn test_map_row_reports_missing_fields() {
        const EMPTY: FieldMap = FieldMap::new("widget", &[]);
        let row = WidgetRow {
            id: 7,
            display_name: "Sage",
            internal_note: "hidden",
        };
        let err = map_row::<_, Widget>(&EMPTY, &row).unwrap_err();
        assert!(err.0.starts_with("Invalid widget row"));
    }
}
