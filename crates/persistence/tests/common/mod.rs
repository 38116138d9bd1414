//! Fixtures for driving the data-access services over the in-memory store.

#![allow(dead_code)]

use domain::models::{
    AccountManager, AccountManagerStatus, AgentStatus, CreateIntegrationInput, CreateTicketInput,
    IntegrationType, SupportAgent, TicketCategory, TicketPriority,
};
use domain::services::{
    AccountManagerApi, AuditApi, AuditDispatcher, ComplianceApi, IntegrationApi, SupportApi,
};
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::Fake;
use persistence::{MemoryStore, Stores};
use serde_json::json;
use uuid::Uuid;

/// Services wired over one shared memory store.
pub struct Harness {
    pub memory: MemoryStore,
    pub stores: Stores,
    pub dispatcher: AuditDispatcher,
    pub support: SupportApi,
    pub account_managers: AccountManagerApi,
    pub integrations: IntegrationApi,
    pub compliance: ComplianceApi,
    pub audit: AuditApi,
}

impl Harness {
    /// Must be called inside a Tokio runtime.
    pub fn new() -> Self {
        let memory = MemoryStore::new();
        let stores = Stores::memory(memory.clone());
        let dispatcher =
            AuditDispatcher::spawn(stores.audit.clone(), stores.integrations.clone(), 100);

        Self {
            support: SupportApi::new(stores.support.clone()),
            account_managers: AccountManagerApi::new(stores.account_managers.clone()),
            integrations: IntegrationApi::new(stores.integrations.clone(), dispatcher.clone()),
            compliance: ComplianceApi::new(stores.compliance.clone(), dispatcher.clone()),
            audit: AuditApi::new(stores.audit.clone(), dispatcher.clone()),
            memory,
            stores,
            dispatcher,
        }
    }
}

pub fn agent(status: AgentStatus, active_tickets: i32) -> SupportAgent {
    SupportAgent {
        id: Uuid::new_v4(),
        name: Name().fake(),
        email: SafeEmail().fake(),
        status,
        active_tickets,
        rating: 4.5,
        specialties: vec!["tax".to_string()],
    }
}

pub fn manager(status: AccountManagerStatus, total_clients: i32) -> AccountManager {
    AccountManager {
        id: Uuid::new_v4(),
        name: Name().fake(),
        email: SafeEmail().fake(),
        phone: None,
        status,
        total_clients,
        specialties: vec!["corporate tax".to_string()],
        timezone: "Africa/Johannesburg".to_string(),
    }
}

pub fn ticket_input(user_id: Uuid) -> CreateTicketInput {
    CreateTicketInput {
        user_id,
        subject: "VAT201 submission rejected".to_string(),
        description: "eFiling returned an error for the March period.".to_string(),
        priority: TicketPriority::High,
        category: TicketCategory::Tax,
    }
}

pub fn integration_input(user_id: Uuid) -> CreateIntegrationInput {
    CreateIntegrationInput {
        user_id,
        name: "Xero".to_string(),
        provider: "xero".to_string(),
        integration_type: IntegrationType::Accounting,
        config: json!({"tenant": "acme"}),
        credentials: json!({}),
        enabled: true,
    }
}
