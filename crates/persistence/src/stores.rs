//! One handle per store trait, backed by PostgreSQL or by memory.

use domain::store::{
    AccountManagerStore, AuditStore, ComplianceStore, IntegrationStore, MetricsStore,
    SupportStore,
};
use sqlx::PgPool;
use std::sync::Arc;

use crate::memory::MemoryStore;
use crate::repositories::{
    AccountManagerRepository, AuditLogRepository, ComplianceRepository, IntegrationRepository,
    SupportRepository, SystemMetricsRepository,
};

/// The datastore as seen by the services.
#[derive(Clone)]
pub struct Stores {
    pub support: Arc<dyn SupportStore>,
    pub account_managers: Arc<dyn AccountManagerStore>,
    pub integrations: Arc<dyn IntegrationStore>,
    pub compliance: Arc<dyn ComplianceStore>,
    pub audit: Arc<dyn AuditStore>,
    pub metrics: Arc<dyn MetricsStore>,
}

impl Stores {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            support: Arc::new(SupportRepository::new(pool.clone())),
            account_managers: Arc::new(AccountManagerRepository::new(pool.clone())),
            integrations: Arc::new(IntegrationRepository::new(pool.clone())),
            compliance: Arc::new(ComplianceRepository::new(pool.clone())),
            audit: Arc::new(AuditLogRepository::new(pool.clone())),
            metrics: Arc::new(SystemMetricsRepository::new(pool)),
        }
    }

    /// Every store backed by the same in-memory tables.
    pub fn memory(store: MemoryStore) -> Self {
        Self {
            support: Arc::new(store.clone()),
            account_managers: Arc::new(store.clone()),
            integrations: Arc::new(store.clone()),
            compliance: Arc::new(store.clone()),
            audit: Arc::new(store.clone()),
            metrics: Arc::new(store),
        }
    }
}
