//! Data-access services.
//!
//! Each service wraps one datastore port and returns the response envelope.
//! Store errors are converted to the envelope here and nowhere else.

pub mod account_manager;
pub mod audit;
pub mod compliance;
pub mod integration;
pub mod support;
pub mod system_metrics;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use shared::field_map::FieldMap;
use validator::Validate;

use crate::store::{ColumnPatch, StoreError, StoreResult};

pub use account_manager::AccountManagerApi;
pub use audit::{AuditApi, AuditDispatcher, AuditRecord, DeadLetter, DeadLetterQueue};
pub use compliance::ComplianceApi;
pub use integration::IntegrationApi;
pub use support::SupportApi;
pub use system_metrics::SystemMetricsApi;

/// Turn a camelCase patch into validated storage columns.
///
/// Field names are checked against `fields` first so unknown and read-only
/// fields get a precise message. The patch is then validated through the typed
/// update input `U` and mapped from its canonical form.
pub(crate) fn storage_patch<U>(fields: &FieldMap, patch: Map<String, Value>) -> StoreResult<ColumnPatch>
where
    U: DeserializeOwned + Serialize + Validate,
{
    fields.to_storage(&patch)?;

    let typed: U = serde_json::from_value(Value::Object(patch.clone()))?;
    typed.validate()?;

    let canonical = match serde_json::to_value(&typed)? {
        Value::Object(canonical) => canonical,
        _ => {
            return Err(StoreError::Invalid(format!(
                "Invalid {} patch",
                fields.resource()
            )))
        }
    };

    // Only nullable fields keep an explicit null through the typed input.
    if let Some(field) = patch.keys().find(|key| !canonical.contains_key(*key)) {
        return Err(StoreError::Invalid(format!(
            "Field '{}' of {} cannot be null",
            field,
            fields.resource()
        )));
    }

    Ok(fields.to_storage(&canonical)?)
}

/// camelCase names of the fields present in a patch, for log details.
pub(crate) fn patched_fields(patch: &Map<String, Value>) -> Vec<String> {
    let mut names: Vec<String> = patch.keys().cloned().collect();
    names.sort();
    names
}
