//! PostgreSQL implementations of the domain store traits.
//!
//! Each repository owns a clone of the pool, exposes inherent query methods
//! returning [`PersistenceResult`](crate::error::PersistenceResult), and
//! implements its store trait by delegating to them.

pub mod account_manager;
pub mod audit_log;
pub mod compliance;
pub mod integration;
pub mod support;
pub mod system_metrics;

use domain::store::{ColumnPatch, StoreError};
use sqlx::PgConnection;

pub use account_manager::AccountManagerRepository;
pub use audit_log::AuditLogRepository;
pub use compliance::ComplianceRepository;
pub use integration::IntegrationRepository;
pub use support::SupportRepository;
pub use system_metrics::SystemMetricsRepository;

/// Advisory lock key serialising support agent picks.
pub(crate) const SUPPORT_AGENT_ASSIGNMENT_LOCK: i64 = 0x7461_7801;
/// Advisory lock key serialising account manager picks.
pub(crate) const ACCOUNT_MANAGER_ASSIGNMENT_LOCK: i64 = 0x7461_7802;

/// Take a transaction-scoped advisory lock for one assignment family.
///
/// Held until commit or rollback, so the least-loaded pick and its increment
/// are never interleaved with another pick from the same family.
pub(crate) async fn lock_assignments(conn: &mut PgConnection, key: i64) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(key)
        .execute(conn)
        .await?;
    Ok(())
}

/// Build `UPDATE ... SET` assignments reading from a populated record `p`.
///
/// Patches are produced by a field map so column names are known identifiers;
/// anything else is rejected rather than interpolated.
pub(crate) fn set_from_record(patch: &ColumnPatch) -> Result<String, StoreError> {
    let mut assignments = Vec::with_capacity(patch.len());
    for column in patch.keys() {
        let valid = !column.is_empty()
            && column
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
        if !valid {
            return Err(StoreError::Invalid(format!("Invalid column '{}'", column)));
        }
        assignments.push(format!("{column} = p.{column}"));
    }
    if assignments.is_empty() {
        return Err(StoreError::Invalid("No fields to update".to_string()));
    }
    Ok(assignments.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_from_record() {
        let patch = json!({"status": "resolved", "resolved_at": null});
        let sql = set_from_record(patch.as_object().unwrap()).unwrap();
        assert_eq!(sql, "resolved_at = p.resolved_at, status = p.status");
    }

    #[test]
    fn test_set_from_record_rejects_odd_identifiers() {
        let patch = json!({"status; DROP TABLE x": 1});
        assert!(set_from_record(patch.as_object().unwrap()).is_err());
        assert!(set_from_record(&ColumnPatch::new()).is_err());
    }
}
