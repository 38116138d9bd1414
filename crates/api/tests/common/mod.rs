//! Common test utilities for integration tests.
//!
//! The router is built over the in-memory backend, so no database is needed.

// Helpers are shared by several test binaries; not every binary uses all of them.
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request},
    Router,
};
use domain::models::{AccountManager, AccountManagerStatus, AgentStatus, SupportAgent};
use persistence::{MemoryStore, Stores};
use tax_business_api::{
    app::{create_app, AppState},
    config::Config,
};
use uuid::Uuid;

/// A router together with the store behind it, for seeding.
pub struct TestApp {
    pub router: Router,
    pub memory: MemoryStore,
    pub state: AppState,
}

/// Test configuration: memory backend, no rate limiting.
pub fn test_config() -> Config {
    Config::load_for_test(&[]).expect("Failed to build test config")
}

/// Build the application with the given configuration.
///
/// Must be called inside a Tokio runtime.
pub fn create_test_app_with(config: Config) -> TestApp {
    let memory = MemoryStore::new();
    let state = AppState::new(config, Stores::memory(memory.clone()), None);
    TestApp {
        router: create_app(state.clone()),
        memory,
        state,
    }
}

pub fn create_test_app() -> TestApp {
    create_test_app_with(test_config())
}

pub fn seed_agent(app: &TestApp, status: AgentStatus, active_tickets: i32) -> SupportAgent {
    let agent = SupportAgent {
        id: Uuid::new_v4(),
        name: format!("Agent {}", &Uuid::new_v4().to_string()[..8]),
        email: "agent@example.com".to_string(),
        status,
        active_tickets,
        rating: 4.8,
        specialties: vec!["vat".to_string()],
    };
    app.memory.insert_agent(&agent);
    agent
}

pub fn seed_manager(app: &TestApp, total_clients: i32) -> AccountManager {
    let manager = AccountManager {
        id: Uuid::new_v4(),
        name: format!("Manager {}", &Uuid::new_v4().to_string()[..8]),
        email: "manager@example.com".to_string(),
        phone: Some("+27 11 000 0000".to_string()),
        status: AccountManagerStatus::Active,
        total_clients,
        specialties: vec!["corporate".to_string()],
        timezone: "Africa/Johannesburg".to_string(),
    };
    app.memory.insert_account_manager(&manager);
    manager
}

pub fn json_request(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

pub fn raw_json_request(method: Method, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Parse a response body as JSON.
pub async fn parse_response_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null)
}
