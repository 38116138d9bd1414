//! Declarative mapping between camelCase API fields and snake_case storage columns.
//!
//! Each resource declares one static [`FieldMap`]. Partial updates arrive
//! camelCase and are translated through the table, so the storage layer only
//! ever sees known column names. Rows read back are renamed the same way.

use serde_json::{Map, Value};
use thiserror::Error;

/// Errors produced while translating field names.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldMapError {
    #[error("Unknown field '{field}' for {resource}")]
    UnknownField {
        resource: &'static str,
        field: String,
    },
    #[error("Field '{field}' of {resource} is read-only")]
    ReadOnlyField {
        resource: &'static str,
        field: String,
    },
    #[error("No fields to update for {resource}")]
    EmptyPatch { resource: &'static str },
}

/// One row of a field mapping table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// camelCase name used by API callers.
    pub api: &'static str,
    /// snake_case column name used by the datastore.
    pub column: &'static str,
    /// Whether callers may set this field in a patch.
    pub writable: bool,
}

impl FieldSpec {
    pub const fn writable(api: &'static str, column: &'static str) -> Self {
        Self {
            api,
            column,
            writable: true,
        }
    }

    pub const fn read_only(api: &'static str, column: &'static str) -> Self {
        Self {
            api,
            column,
            writable: false,
        }
    }
}

/// Field mapping table for one resource.
#[derive(Debug, Clone, Copy)]
pub struct FieldMap {
    resource: &'static str,
    fields: &'static [FieldSpec],
}

impl FieldMap {
    pub const fn new(resource: &'static str, fields: &'static [FieldSpec]) -> Self {
        Self { resource, fields }
    }

    pub fn resource(&self) -> &'static str {
        self.resource
    }

    /// API field name for a storage column.
    pub fn api_for(&self, column: &str) -> Option<&'static str> {
        self.fields.iter().find(|f| f.column == column).map(|f| f.api)
    }

    /// Translate a camelCase patch into storage columns.
    ///
    /// Rejects unknown and read-only fields, and empty patches.
    pub fn to_storage(&self, patch: &Map<String, Value>) -> Result<Map<String, Value>, FieldMapError> {
        if patch.is_empty() {
            return Err(FieldMapError::EmptyPatch {
                resource: self.resource,
            });
        }

        let mut out = Map::with_capacity(patch.len());
        for (key, value) in patch {
            let spec = self
                .fields
                .iter()
                .find(|f| f.api == key)
                .ok_or_else(|| FieldMapError::UnknownField {
                    resource: self.resource,
                    field: key.clone(),
                })?;
            if !spec.writable {
                return Err(FieldMapError::ReadOnlyField {
                    resource: self.resource,
                    field: key.clone(),
                });
            }
            out.insert(spec.column.to_string(), value.clone());
        }
        Ok(out)
    }

    /// Translate a storage row into camelCase. Columns missing from the table are dropped.
    pub fn to_api(&self, row: &Map<String, Value>) -> Map<String, Value> {
        row.iter()
            .filter_map(|(column, value)| {
                self.api_for(column)
                    .map(|api| (api.to_string(), value.clone()))
            })
            .collect()
    }
}
