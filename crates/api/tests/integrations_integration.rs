//! Integration tests for third-party integration endpoints.

mod common;

use axum::http::{Method, StatusCode};
use common::{
    create_test_app, empty_request, get_request, json_request, parse_response_body, TestApp,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

async fn create_integration(app: &TestApp, user_id: Uuid, enabled: bool) -> Value {
    let response = app
        .router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/integrations",
            json!({
                "userId": user_id,
                "name": "Sage Business Cloud",
                "provider": "sage",
                "integrationType": "accounting",
                "config": {"region": "za"},
                "enabled": enabled,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    parse_response_body(response).await["data"].clone()
}

#[tokio::test]
async fn test_create_and_list_integrations() {
    let app = create_test_app();
    let user_id = Uuid::new_v4();
    let created = create_integration(&app, user_id, true).await;
    assert_eq!(created["status"], "inactive");

    let response = app
        .router
        .clone()
        .oneshot(get_request(&format!("/api/v1/integrations?userId={}", user_id)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["data"], json!([created]));
}

#[tokio::test]
async fn test_create_integration_rejects_unknown_type() {
    let app = create_test_app();

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/integrations",
            json!({
                "userId": Uuid::new_v4(),
                "name": "Fax",
                "provider": "fax",
                "integrationType": "telex",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_integration() {
    let app = create_test_app();
    let created = create_integration(&app, Uuid::new_v4(), true).await;
    let id = created["id"].as_str().unwrap();

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            Method::PATCH,
            &format!("/api/v1/integrations/{}", id),
            json!({"name": "Sage Pastel"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(parse_response_body(response).await["data"]["name"], "Sage Pastel");
}

#[tokio::test]
async fn test_sync_sets_active_and_logs() {
    let app = create_test_app();
    let created = create_integration(&app, Uuid::new_v4(), true).await;
    let id = created["id"].as_str().unwrap();

    let response = app
        .router
        .clone()
        .oneshot(empty_request(
            Method::POST,
            &format!("/api/v1/integrations/{}/sync", id),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let synced = parse_response_body(response).await;
    assert_eq!(synced["data"]["status"], "active");
    assert!(synced["data"]["lastSync"].is_string());

    app.state.audit.flush().await;

    let response = app
        .router
        .clone()
        .oneshot(get_request(&format!("/api/v1/integrations/{}/logs", id)))
        .await
        .unwrap();
    let logs = parse_response_body(response).await;
    let actions: Vec<&str> = logs["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|l| l["action"].as_str())
        .collect();
    assert!(actions.contains(&"create"));
    assert!(actions.contains(&"sync"));
}

#[tokio::test]
async fn test_disabled_integration_cannot_be_tested() {
    let app = create_test_app();
    let created = create_integration(&app, Uuid::new_v4(), false).await;
    let id = created["id"].as_str().unwrap();

    let response = app
        .router
        .clone()
        .oneshot(empty_request(
            Method::POST,
            &format!("/api/v1/integrations/{}/test", id),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = parse_response_body(response).await;
    assert_eq!(body["error"], "Integration is disabled");
}

#[tokio::test]
async fn test_delete_integration_keeps_logs() {
    let app = create_test_app();
    let created = create_integration(&app, Uuid::new_v4(), true).await;
    let id = created["id"].as_str().unwrap();

    let response = app
        .router
        .clone()
        .oneshot(empty_request(
            Method::DELETE,
            &format!("/api/v1/integrations/{}", id),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(parse_response_body(response).await["data"]["id"], id);

    let response = app
        .router
        .clone()
        .oneshot(get_request(&format!("/api/v1/integrations/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    app.state.audit.flush().await;
    let response = app
        .router
        .clone()
        .oneshot(get_request(&format!("/api/v1/integrations/{}/logs", id)))
        .await
        .unwrap();
    let logs = parse_response_body(response).await;
    assert!(logs["data"]
        .as_array()
        .unwrap()
        .iter()
        .any(|l| l["action"] == "delete"));
}

#[tokio::test]
async fn test_invalid_path_id_is_envelope() {
    let app = create_test_app();

    let response = app
        .router
        .clone()
        .oneshot(get_request("/api/v1/integrations/not-a-uuid"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(parse_response_body(response).await["success"], false);
}
